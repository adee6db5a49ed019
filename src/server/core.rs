//! Server core functionality
//!
//! The single-threaded event loop. One `mio::Poll` watches the listening
//! socket and every client socket; each socket is registered under a token
//! equal to its raw descriptor, which is also its connection table index.
//!
//! The loop alternates between two states. While waiting it blocks in
//! `poll` for at most the configured timeout. While dispatching it first
//! accepts at most one new connection, then services every ready client in
//! ascending descriptor order. A broadcast caused by one client completes
//! before the next client is read.

use log::{debug, error, info, trace, warn};
use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token};
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::os::fd::AsRawFd;
use std::time::Duration;

use crate::client::{accept_new, disconnect};
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::server::ChatState;
use crate::server::handler::{LineAction, route_line};
use crate::utils::network::{self, ReadOutcome};

const EVENTS_CAPACITY: usize = 1024;

/// Where the event loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Waiting,
    Dispatching,
}

pub struct ChatServer {
    poll: Poll,
    listener: TcpListener,
    listener_token: Token,
    state: ChatState<TcpStream>,
    config: ServerConfig,
    loop_state: LoopState,
    accept_pending: bool,
    read_buf: Vec<u8>,
}

impl ChatServer {
    /// Creates the poller and the listening socket.
    ///
    /// Failing to bind or listen is fatal for the server.
    pub fn bind(config: ServerConfig) -> Result<Self, ChatServerError> {
        config.validate()?;

        let poll = Poll::new()?;
        let addr = config.listen_socket();
        let mut listener = match network::create_tcp_server(&addr) {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(e.into());
            }
        };

        let listener_token = Token(listener.as_raw_fd() as usize);
        poll.registry()
            .register(&mut listener, listener_token, Interest::READABLE)?;

        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            poll,
            listener,
            listener_token,
            state: ChatState::new(&config),
            read_buf: vec![0u8; config.read_buffer_size],
            config,
            loop_state: LoopState::Waiting,
            accept_pending: false,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &ChatState<TcpStream> {
        &self.state
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Runs the event loop until a fatal error occurs.
    pub fn run(&mut self) -> Result<(), ChatServerError> {
        info!(
            "Starting chat server on {} (max {} clients)",
            self.local_addr()?,
            self.config.max_clients
        );

        let mut events = Events::with_capacity(EVENTS_CAPACITY);
        loop {
            self.poll_once(&mut events)?;
        }
    }

    /// Runs one wait-then-dispatch cycle. Returns the number of ready events.
    pub fn poll_once(&mut self, events: &mut Events) -> Result<usize, ChatServerError> {
        self.loop_state = LoopState::Waiting;

        // A connection accepted last round may have company in the backlog;
        // the edge-triggered listener will not report it again.
        let timeout = if self.accept_pending {
            Duration::ZERO
        } else {
            self.config.poll_timeout()
        };

        match self.poll.poll(events, Some(timeout)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(0),
            Err(e) => {
                error!("Poll failed: {}", e);
                return Err(e.into());
            }
        }

        let mut ready: Vec<usize> = events.iter().map(|event| event.token().0).collect();
        let listener_ready = self.accept_pending || ready.contains(&self.listener_token.0);
        ready.retain(|&descriptor| descriptor != self.listener_token.0);
        ready.sort_unstable();
        ready.dedup();

        if !listener_ready && ready.is_empty() {
            trace!("Poll timeout, {} clients connected", self.state.table.count());
            return Ok(0);
        }

        self.loop_state = LoopState::Dispatching;
        trace!("Dispatching {} ready clients", ready.len());

        if listener_ready {
            self.accept_one();
        }

        for descriptor in ready {
            // An earlier client in this batch may have caused this one to go away.
            if self.state.table.contains(descriptor) {
                self.service_client(descriptor);
            }
        }

        Ok(events.iter().count())
    }

    /// Accepts a single pending connection and registers it.
    fn accept_one(&mut self) {
        let (stream, addr) = match network::accept_client(&self.listener) {
            Ok(Some(accepted)) => accepted,
            Ok(None) => {
                self.accept_pending = false;
                return;
            }
            Err(e) => {
                // Retrying right away would spin on errors like EMFILE; the
                // next incoming connection wakes the listener again.
                self.accept_pending = false;
                warn!("Error accepting connection: {}", e);
                return;
            }
        };
        self.accept_pending = true;

        let descriptor = stream.as_raw_fd() as usize;
        let registered = match accept_new(&mut self.state, descriptor, stream) {
            Ok(client) => {
                debug!("Accepted {} from {}", client.nickname(), addr);
                self.poll.registry().register(
                    client.stream_mut(),
                    Token(descriptor),
                    Interest::READABLE,
                )
            }
            Err(e) => {
                warn!("Rejected connection from {}: {}", addr, e);
                return;
            }
        };

        if let Err(e) = registered {
            warn!("Failed to register client {}: {}", descriptor, e);
            self.close_client(descriptor, "poll registration failed");
        }
    }

    /// Reads a ready client until it would block. The lines completed by each
    /// read are routed before the next read.
    fn service_client(&mut self, descriptor: usize) {
        loop {
            let max_line_length = self.state.max_line_length;
            let Some(client) = self.state.table.get_mut(descriptor) else {
                return;
            };

            let lines = match network::read_available(client.stream_mut(), &mut self.read_buf) {
                Ok(ReadOutcome::Data(n)) => {
                    client.buffer_input(&self.read_buf[..n]);
                    client.take_lines(max_line_length)
                }
                Ok(ReadOutcome::WouldBlock) => return,
                Ok(ReadOutcome::Closed) => {
                    self.close_client(descriptor, "peer closed connection");
                    return;
                }
                Err(e) => {
                    debug!("Failed to read from {}: {}", descriptor, e);
                    self.close_client(descriptor, "read error");
                    return;
                }
            };

            for line in lines {
                if route_line(&mut self.state, descriptor, &line) == LineAction::Quit {
                    self.close_client(descriptor, "client quit");
                    return;
                }
            }
        }
    }

    /// Disconnects a live client and detaches its socket from the poller.
    fn close_client(&mut self, descriptor: usize, reason: &str) {
        match disconnect(&mut self.state, descriptor, reason) {
            Ok(mut client) => {
                if let Err(e) = self.poll.registry().deregister(client.stream_mut()) {
                    debug!("Failed to deregister {}: {}", descriptor, e);
                }
                // Dropping the client closes the socket.
            }
            Err(e) => error!("Disconnect of {} failed: {}", descriptor, e),
        }
    }
}
