//! Structured decision produced by the model for each conversational turn.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::question::QuestionCategory;
use crate::session::{normalize_label, InterviewStage};

/// Shown to the candidate when the backend cannot be reached.
pub const BACKEND_UNAVAILABLE_MESSAGE: &str =
    "I apologize, but I'm having technical difficulties. Let's continue with the interview.";

/// Used when the model returns nothing at all.
pub const EMPTY_RESPONSE_MESSAGE: &str = "Thank you. Could you tell me a little more about that?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    AskQuestion,
    Evaluate,
    ProgressStage,
    Conclude,
}

impl DecisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::AskQuestion => "ask_question",
            DecisionAction::Evaluate => "evaluate",
            DecisionAction::ProgressStage => "progress_stage",
            DecisionAction::Conclude => "conclude",
        }
    }
}

impl Default for DecisionAction {
    fn default() -> Self {
        Self::AskQuestion
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "ask_question" | "ask" | "question" => Ok(DecisionAction::AskQuestion),
            "evaluate" | "evaluation" => Ok(DecisionAction::Evaluate),
            "progress_stage" | "next_stage" => Ok(DecisionAction::ProgressStage),
            "conclude" | "end" | "finish" => Ok(DecisionAction::Conclude),
            other => Err(CoreError::validation(format!("unknown action: {}", other))),
        }
    }
}

/// The model's assessment of the candidate's latest answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    /// Clamped into 0..=10 by the interpreter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl AnswerEvaluation {
    /// Score used for the performance level. An evaluation without a score
    /// counts as average.
    pub fn effective_score(&self) -> f64 {
        self.score.unwrap_or(5.0)
    }
}

/// Typed result of interpreting one model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Text shown to the candidate
    pub message: String,
    pub stage: InterviewStage,
    pub action: DecisionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_category: Option<QuestionCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<AnswerEvaluation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<InterviewStage>,
}

impl Decision {
    /// Plain question in the current stage carrying no updates.
    pub fn fallback(message: impl Into<String>, stage: InterviewStage) -> Self {
        Self {
            message: message.into(),
            stage,
            action: DecisionAction::AskQuestion,
            question_category: None,
            evaluation: None,
            next_stage: None,
        }
    }

    /// Returned to the caller when the backend call failed.
    pub fn backend_unavailable(stage: InterviewStage) -> Self {
        Self::fallback(BACKEND_UNAVAILABLE_MESSAGE, stage)
    }

    pub fn is_question(&self) -> bool {
        self.action == DecisionAction::AskQuestion
    }

    pub fn concludes(&self) -> bool {
        self.action == DecisionAction::Conclude
    }
}
