//! Core Error Types
//!
//! Defines the foundational error types used by the interview domain model.
//! These error types are dependency-light (only thiserror + serde_json) to keep
//! the core crate free of storage and network concerns.
//!
//! The main application crate extends these with additional error variants
//! (e.g., Database, Sqlite, BackendUnavailable) that require heavier dependencies.

use thiserror::Error;

/// Core error type for the interview domain.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation invoked while the session status does not allow it
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The LLM replied with text that does not match the decision schema
    #[error("Malformed decision: {0}")]
    MalformedDecision(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a malformed decision error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDecision(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
