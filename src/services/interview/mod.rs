//! Interview Agent Service
//!
//! Drives a candidate through the greeting, personal, resume, technical and
//! closing stages, scores answers, enforces the anti-cheating threshold and
//! writes the final evaluation.

pub mod agent;
pub mod evaluation;
pub mod locks;
pub mod prompt;

pub use agent::{CheatingOutcome, InterviewAgent};
pub use evaluation::{ScoreSummary, EVALUATION_FAILED_NOTICE};
pub use locks::SessionLocks;
pub use prompt::{build_prompt, Prompt};
