//! Client management system
//!
//! Handles per-client state, the descriptor-indexed connection table, and
//! the connect/disconnect lifecycle.

pub mod lifecycle;
pub mod state;
pub mod table;

pub use lifecycle::{accept_new, disconnect};
pub use state::Client;
pub use table::ConnectionTable;
