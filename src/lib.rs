//! Interview Agent - Rust Backend Library
//!
//! This library provides an LLM-driven job interviewer.
//! It includes:
//! - The interview agent state machine and final evaluation
//! - Resume parsing and candidate notifications
//! - Storage layer (SQLite sessions, JSON config)
//! - Command handlers for the CLI front end

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::settings::{AgentSettings, AppConfig};
pub use services::interview::{CheatingOutcome, InterviewAgent};
pub use state::AppState;
pub use storage::{Database, SessionStore};
pub use utils::error::{AppError, AppResult};
