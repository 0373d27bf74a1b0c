//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod interview;
pub mod notification;
pub mod resume;

pub use interview::{CheatingOutcome, InterviewAgent};
pub use notification::{LogNotifier, Notifier};
pub use resume::ResumeParser;
