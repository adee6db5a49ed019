//! Network utilities
//!
//! Socket primitives used by the event loop: listener creation, accept,
//! and non-blocking reads and writes that retry interrupted system calls.

use mio::net::{TcpListener, TcpStream};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, ToSocketAddrs};

/// Outcome of one read attempt on a non-blocking socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n > 0` bytes were placed at the front of the buffer
    Data(usize),
    /// Nothing to read right now
    WouldBlock,
    /// The peer closed its side of the connection
    Closed,
}

/// Resolve `addr` and bind a non-blocking listening socket to it.
///
/// The listener has `SO_REUSEADDR` set and a backlog of 1024.
pub fn create_tcp_server(addr: &str) -> io::Result<TcpListener> {
    let socket_addr = resolve(addr)?;
    TcpListener::bind(socket_addr)
}

fn resolve(addr: &str) -> io::Result<SocketAddr> {
    addr.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("address {} did not resolve", addr),
        )
    })
}

/// Accept one pending connection, retrying when interrupted by a signal.
///
/// Returns `Ok(None)` when no connection is pending. The returned stream is
/// non-blocking and has `TCP_NODELAY` set.
pub fn accept_client(listener: &TcpListener) -> io::Result<Option<(TcpStream, SocketAddr)>> {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                stream.set_nodelay(true)?;
                return Ok(Some((stream, addr)));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
            Err(e) => return Err(e),
        }
    }
}

/// Read whatever is available into `buf`, retrying on interruption.
pub fn read_available<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<ReadOutcome> {
    loop {
        match reader.read(buf) {
            Ok(0) => return Ok(ReadOutcome::Closed),
            Ok(n) => return Ok(ReadOutcome::Data(n)),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(ReadOutcome::WouldBlock),
            Err(e) => return Err(e),
        }
    }
}

/// Write as much of `bytes` as the socket accepts without blocking.
///
/// Returns the number of bytes written, which is short of `bytes.len()` when
/// the socket buffer filled up. The remainder is not queued.
pub fn write_best_effort<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<usize> {
    let mut written = 0;

    while written < bytes.len() {
        match writer.write(&bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "peer stopped accepting data",
                ));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => break,
            Err(e) => return Err(e),
        }
    }

    Ok(written)
}
