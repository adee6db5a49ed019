//! SmallChat Server - Entry Point
//!
//! Loads configuration, binds the listening socket and runs the event loop.

use log::info;
use std::process;

use smallchat::error::handlers::{error_to_exit_code, handle_error};
use smallchat::error::ChatServerError;
use smallchat::utils::logging::setup_logging;
use smallchat::{ChatServer, ServerConfig};

fn main() {
    setup_logging();

    info!("Launching chat server...");

    if let Err(e) = run() {
        handle_error(&e);
        process::exit(error_to_exit_code(&e));
    }
}

fn run() -> Result<(), ChatServerError> {
    let config = ServerConfig::load()?;
    let mut server = ChatServer::bind(config)?;
    server.run()
}
