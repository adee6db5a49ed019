//! Chat line protocol
//!
//! Handles classification of client lines and formatting of server messages.

pub mod commands;
pub mod responses;

pub use commands::{Command, parse_command};
pub use responses::Presence;
