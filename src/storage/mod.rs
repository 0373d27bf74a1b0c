//! Storage Layer
//!
//! Handles all data persistence: SQLite database, interview sessions, and JSON config.

pub mod config;
pub mod database;
pub mod sessions;

pub use config::*;
pub use database::*;
pub use sessions::*;
