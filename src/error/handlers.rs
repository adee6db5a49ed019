//! Error handlers
//!
//! Reporting for errors that end the server process.

use crate::error::types::ChatServerError;
use log::error;

/// Log a fatal server error
pub fn handle_error(err: &ChatServerError) {
    error!("Chat server error: {}", err);
}

/// Convert a fatal error to a process exit code
pub fn error_to_exit_code(err: &ChatServerError) -> i32 {
    match err {
        ChatServerError::ConfigError(_) => 78,
        ChatServerError::IoError(_) => 74,
        ChatServerError::Table(_) => 70,
    }
}
