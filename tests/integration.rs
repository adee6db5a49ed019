use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use smallchat::{ChatServer, ServerConfig};

const WELCOME: &str = "Welcome to Simple Chat! Use /nick <nick> to set your nick.\n";

// Start a server on an ephemeral port in a separate thread
fn start_test_server(max_clients: usize) -> SocketAddr {
    let config = ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        max_clients,
        poll_timeout_ms: 50,
        ..ServerConfig::default()
    };
    let mut server = ChatServer::bind(config).unwrap();
    let addr = server.local_addr().unwrap();

    thread::spawn(move || {
        let _ = server.run();
    });

    addr
}

struct Peer {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Peer {
    // Connect and consume the welcome banner
    fn join(addr: SocketAddr) -> Peer {
        let mut peer = Peer::connect(addr);
        assert_eq!(peer.read_line(), WELCOME);
        peer
    }

    fn connect(addr: SocketAddr) -> Peer {
        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        Peer {
            reader: BufReader::new(stream.try_clone().unwrap()),
            writer: stream,
        }
    }

    fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).unwrap();
        self.writer.flush().unwrap();
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line
    }

    // True if nothing arrives within a short window
    fn is_quiet(&mut self) -> bool {
        self.writer
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();
        let mut buf = [0u8; 64];
        let quiet = match self.reader.read(&mut buf) {
            Ok(_) => false,
            Err(e) => matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut),
        };
        self.writer
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        quiet
    }
}

fn is_join_notice(line: &str) -> bool {
    line.starts_with("Player [user:") && line.ends_with("] enter Chat!\n")
}

#[test]
fn test_initial_connection() {
    let addr = start_test_server(8);
    let mut a = Peer::connect(addr);
    assert_eq!(a.read_line(), WELCOME);
}

#[test]
fn test_join_notice_sent_to_others_only() {
    let addr = start_test_server(8);
    let mut a = Peer::join(addr);
    let mut b = Peer::join(addr);

    assert!(is_join_notice(&a.read_line()));
    assert!(b.is_quiet());
}

#[test]
fn test_chat_line_relayed_excluding_sender() {
    let addr = start_test_server(8);
    let mut a = Peer::join(addr);
    let mut b = Peer::join(addr);
    assert!(is_join_notice(&a.read_line()));

    a.send("hello\n");
    let line = b.read_line();
    assert!(line.starts_with("user:"));
    assert!(line.ends_with("> hello\n"));
    assert!(a.is_quiet());

    a.send("/nick alice\nhi again\r\n");
    assert_eq!(b.read_line(), "alice> hi again\n");
}

#[test]
fn test_disconnect_notifies_remaining_client() {
    let addr = start_test_server(8);
    let mut a = Peer::join(addr);
    let mut b = Peer::join(addr);
    assert!(is_join_notice(&a.read_line()));

    a.send("/nick alice\n");
    drop(a);
    assert_eq!(b.read_line(), "Player [alice] Quit Chat!\n");

    let mut c = Peer::join(addr);
    assert!(is_join_notice(&b.read_line()));
    b.send("still here\n");
    assert!(c.read_line().ends_with("> still here\n"));
}

#[test]
fn test_quit_token_closes_connection() {
    let addr = start_test_server(8);
    let mut a = Peer::join(addr);
    let mut b = Peer::join(addr);
    assert!(is_join_notice(&a.read_line()));

    b.send("/nick bob\n/quit\n");
    assert_eq!(a.read_line(), "Player [bob] Quit Chat!\n");
    assert_eq!(b.read_line(), "");
}

#[test]
fn test_unknown_command_answered_privately() {
    let addr = start_test_server(8);
    let mut a = Peer::join(addr);
    let mut b = Peer::join(addr);
    assert!(is_join_notice(&a.read_line()));

    a.send("/dance\n");
    assert_eq!(a.read_line(), "Unsupported command\n");
    assert!(b.is_quiet());
}

#[test]
fn test_connection_rejected_at_capacity() {
    let addr = start_test_server(2);
    let mut a = Peer::join(addr);
    let mut b = Peer::join(addr);
    assert!(is_join_notice(&a.read_line()));

    // Third connection is accepted by the kernel, then closed by the server.
    let mut c = Peer::connect(addr);
    let mut buf = [0u8; 64];
    match c.reader.read(&mut buf) {
        Ok(n) => assert_eq!(n, 0),
        Err(e) => assert_eq!(e.kind(), ErrorKind::ConnectionReset),
    }

    // Existing clients are undisturbed and saw no notice for the rejected peer.
    a.send("/nick alice\nstill works\n");
    assert_eq!(b.read_line(), "alice> still works\n");
}
