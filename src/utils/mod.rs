//! Utility functions
//!
//! Provides logging and socket utilities.

pub mod logging;
pub mod network;
