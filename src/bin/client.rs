//! SmallChat Client
//!
//! Connects to a chat server, sends every stdin line and prints whatever
//! the server sends back.

use log::{error, info};
use std::process;
use tokio::io::{self, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <host> <port>", args[0]);
        process::exit(1);
    }

    let port: u16 = match args[2].parse() {
        Ok(port) => port,
        Err(e) => {
            eprintln!("Invalid port {}: {}", args[2], e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&args[1], port).await {
        error!("Connection to {}:{} failed: {}", args[1], port, e);
        process::exit(1);
    }
}

async fn run(host: &str, port: u16) -> io::Result<()> {
    let socket = TcpStream::connect((host, port)).await?;
    socket.set_nodelay(true)?;
    info!("Connected to {}", socket.peer_addr()?);

    let (mut reader, mut writer) = socket.into_split();
    let mut input = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut buf = [0u8; 1024];

    loop {
        tokio::select! {
            // Server output is shown as-is; it is just text to print.
            result = reader.read(&mut buf) => {
                match result? {
                    0 => {
                        info!("Server closed the connection");
                        break;
                    }
                    n => {
                        stdout.write_all(&buf[..n]).await?;
                        stdout.flush().await?;
                    }
                }
            }

            line = input.next_line() => {
                match line? {
                    Some(line) => {
                        writer.write_all(line.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    None => {
                        // stdin closed, let the server see the disconnect
                        writer.shutdown().await?;
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
