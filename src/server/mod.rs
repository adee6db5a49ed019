//! Server core functionality
//!
//! This module contains the event loop, the chat state it owns, line
//! routing and the broadcast router.

pub mod broadcast;
pub mod core;
pub mod handler;
pub mod state;

pub use self::core::{ChatServer, LoopState};
pub use state::ChatState;
