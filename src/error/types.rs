//! Error types
//!
//! Defines the error types of the connection table and the chat server.

use std::fmt;
use std::io;

/// Connection table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The table already holds `max_clients` live clients
    CapacityExceeded(usize),
    /// The slot for this descriptor is already occupied
    DuplicateSlot(usize),
    /// No client lives at this descriptor
    NotFound(usize),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::CapacityExceeded(max) => {
                write!(f, "Connection table full ({} clients)", max)
            }
            TableError::DuplicateSlot(fd) => write!(f, "Slot {} is already occupied", fd),
            TableError::NotFound(fd) => write!(f, "No client at slot {}", fd),
        }
    }
}

impl std::error::Error for TableError {}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Table(TableError),
    IoError(io::Error),
    ConfigError(config::ConfigError),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Table(e) => write!(f, "Connection table error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
            ChatServerError::ConfigError(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatServerError::Table(e) => Some(e),
            ChatServerError::IoError(e) => Some(e),
            ChatServerError::ConfigError(e) => Some(e),
        }
    }
}

impl From<TableError> for ChatServerError {
    fn from(error: TableError) -> Self {
        ChatServerError::Table(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::ConfigError(error)
    }
}
