//! Interview Agent Core
//!
//! Domain model, error types, and the response interpreter for the interview
//! agent. This crate has zero dependencies on application-level code
//! (database, LLM providers, CLI, etc.).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `session` - Session aggregate, stages, status and agent working state
//! - `question` - Scored question/answer records and categories
//! - `cheating` - Anti-cheating event types
//! - `resume` - Structured resume profile
//! - `decision` - Typed model decision for one turn
//! - `interpreter` - Raw model text to `Decision`, tolerant of malformed output
//!
//! ## Design Principles
//!
//! 1. **Pure** - nothing here performs I/O, so every rule is unit-testable
//! 2. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod cheating;
pub mod decision;
pub mod error;
pub mod interpreter;
pub mod question;
pub mod resume;
pub mod session;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Session Aggregate ──────────────────────────────────────────────────
pub use session::{
    AgentState, ConversationTurn, InterviewSession, InterviewStage, PerformanceLevel,
    SessionStatus, TurnRole,
};

// ── Records ────────────────────────────────────────────────────────────
pub use cheating::{CheatingEvent, CheatingEventType, EventMetadata};
pub use question::{Question, QuestionCategory};
pub use resume::{ContactInfo, ResumeProfile};

// ── Decisions ──────────────────────────────────────────────────────────
pub use decision::{
    AnswerEvaluation, Decision, DecisionAction, BACKEND_UNAVAILABLE_MESSAGE,
    EMPTY_RESPONSE_MESSAGE,
};
pub use interpreter::{interpret, Interpretation};
