//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use interview_agent_core::CoreError;
use interview_agent_llm::LlmError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The LLM backend could not produce a reply (network, HTTP, timeout)
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Model output did not match the decision schema
    #[error("Malformed decision: {0}")]
    MalformedDecision(String),

    /// Operation not allowed in the session's current status
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite errors (auto-converted from rusqlite::Error)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a backend unavailable error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create an invalid session state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidSessionState(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidState(msg) => AppError::InvalidSessionState(msg),
            CoreError::Validation(msg) => AppError::Validation(msg),
            CoreError::MalformedDecision(msg) => AppError::MalformedDecision(msg),
            CoreError::Serialization(e) => AppError::Serialization(e),
        }
    }
}

/// Every backend failure is reported the same way to callers.
impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::BackendUnavailable(err.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Convert AppError to a string suitable for display
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
