//! Chat state
//!
//! The context every lifecycle and routing operation works on: the
//! connection table plus the message limits taken from the configuration.

use crate::client::{Client, ConnectionTable};
use crate::config::ServerConfig;

/// Shared mutable state of one chat server, owned by its event loop.
pub struct ChatState<S> {
    pub table: ConnectionTable<Client<S>>,
    pub max_nick_length: usize,
    pub max_line_length: usize,
    pub max_message_length: usize,
}

impl<S> ChatState<S> {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            table: ConnectionTable::new(config.max_clients),
            max_nick_length: config.max_nick_length,
            max_line_length: config.max_line_length,
            max_message_length: config.max_message_length,
        }
    }

    /// Nickname of the client at `descriptor`, if it is live.
    pub fn nickname(&self, descriptor: usize) -> Option<&str> {
        self.table.get(descriptor).map(Client::nickname)
    }
}
