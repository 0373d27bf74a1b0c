//! Question records
//!
//! A `Question` is written once, when an evaluation from the model can be
//! attributed to an earlier question, and never updated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::session::{normalize_label, InterviewStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionCategory {
    Personal,
    Resume,
    Technical,
    Coding,
    Behavioral,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Personal => "PERSONAL",
            QuestionCategory::Resume => "RESUME",
            QuestionCategory::Technical => "TECHNICAL",
            QuestionCategory::Coding => "CODING",
            QuestionCategory::Behavioral => "BEHAVIORAL",
        }
    }

    /// Counted towards the technical sub-score.
    pub fn is_technical(&self) -> bool {
        matches!(self, QuestionCategory::Technical | QuestionCategory::Coding)
    }

    /// Counted towards the communication sub-score.
    pub fn is_communication(&self) -> bool {
        matches!(self, QuestionCategory::Personal | QuestionCategory::Behavioral)
    }

    /// Category assumed for a question asked during `stage` when the model did
    /// not label it.
    pub fn for_stage(stage: InterviewStage) -> Self {
        match stage {
            InterviewStage::Greeting | InterviewStage::Personal => QuestionCategory::Personal,
            InterviewStage::Resume => QuestionCategory::Resume,
            InterviewStage::Technical => QuestionCategory::Technical,
            InterviewStage::Closing => QuestionCategory::Behavioral,
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "personal" => Ok(QuestionCategory::Personal),
            "resume" | "resume_based" => Ok(QuestionCategory::Resume),
            "technical" => Ok(QuestionCategory::Technical),
            "coding" => Ok(QuestionCategory::Coding),
            "behavioral" | "behavioural" => Ok(QuestionCategory::Behavioral),
            other => Err(CoreError::validation(format!(
                "unknown question category: {}",
                other
            ))),
        }
    }
}

/// A scored question/answer pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub session_token: String,
    pub question_text: String,
    pub category: QuestionCategory,
    pub asked_at: DateTime<Utc>,
    pub answer_text: String,
    pub received_at: DateTime<Utc>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

impl Question {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_token: impl Into<String>,
        question_text: impl Into<String>,
        category: QuestionCategory,
        asked_at: DateTime<Utc>,
        answer_text: impl Into<String>,
        received_at: DateTime<Utc>,
        score: Option<f64>,
        feedback: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_token: session_token.into(),
            question_text: question_text.into(),
            category,
            asked_at,
            answer_text: answer_text.into(),
            received_at,
            score,
            feedback,
        }
    }
}
