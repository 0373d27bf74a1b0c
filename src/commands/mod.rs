//! Command Handlers
//!
//! Entry points behind the `interview-agent` subcommands. Each handler takes
//! the initialized [`crate::state::AppState`] and returns plain data for the
//! binary to print.

pub mod interview;
pub mod sessions;

pub use interview::*;
pub use sessions::*;
