//! Interview Session Model
//!
//! The aggregate root of the interview domain. A session owns its
//! conversation history, the agent's working state, and the inline mirror of
//! its cheating log. Status only ever moves forward:
//!
//! ```text
//! CREATED -> IN_PROGRESS -> COMPLETED
//!                        \-> TERMINATED
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cheating::CheatingEvent;
use crate::decision::Decision;
use crate::error::{CoreError, CoreResult};
use crate::resume::ResumeProfile;

/// Lifecycle status of an interview session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Created,
    InProgress,
    Completed,
    Terminated,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "CREATED",
            SessionStatus::InProgress => "IN_PROGRESS",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Terminated => "TERMINATED",
        }
    }

    /// COMPLETED and TERMINATED admit no further conversation.
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Terminated)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "created" => Ok(SessionStatus::Created),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "terminated" => Ok(SessionStatus::Terminated),
            other => Err(CoreError::validation(format!(
                "unknown session status: {}",
                other
            ))),
        }
    }
}

/// Conversational stage the agent is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStage {
    Greeting,
    Personal,
    Resume,
    Technical,
    Closing,
}

impl InterviewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStage::Greeting => "greeting",
            InterviewStage::Personal => "personal",
            InterviewStage::Resume => "resume",
            InterviewStage::Technical => "technical",
            InterviewStage::Closing => "closing",
        }
    }
}

impl Default for InterviewStage {
    fn default() -> Self {
        Self::Greeting
    }
}

impl fmt::Display for InterviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parse: models write "resume-based", "Technical", "closing stage" ...
impl FromStr for InterviewStage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = normalize_label(s);
        let label = label.strip_suffix("_stage").unwrap_or(&label);
        match label {
            "greeting" | "introduction" | "intro" => Ok(InterviewStage::Greeting),
            "personal" => Ok(InterviewStage::Personal),
            "resume" | "resume_based" | "resume_review" => Ok(InterviewStage::Resume),
            "technical" => Ok(InterviewStage::Technical),
            "closing" | "conclusion" => Ok(InterviewStage::Closing),
            other => Err(CoreError::validation(format!(
                "unknown interview stage: {}",
                other
            ))),
        }
    }
}

/// Coarse performance bucket derived from the latest answer score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    Low,
    Medium,
    High,
}

impl PerformanceLevel {
    /// `>= 8` is high, `<= 4` is low, anything between is medium.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            PerformanceLevel::High
        } else if score <= 4.0 {
            PerformanceLevel::Low
        } else {
            PerformanceLevel::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Low => "low",
            PerformanceLevel::Medium => "medium",
            PerformanceLevel::High => "high",
        }
    }
}

impl Default for PerformanceLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One entry of the append-only conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    /// The interpreted decision behind an assistant turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Decision>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(decision: Decision) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: decision.message.clone(),
            metadata: Some(decision),
            timestamp: Utc::now(),
        }
    }
}

/// Working memory of the agent, persisted with the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub current_stage: InterviewStage,
    pub questions_asked: u32,
    pub performance_level: PerformanceLevel,
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    #[serde(default)]
    pub strong_areas: Vec<String>,
    /// History index of the most recent assistant turn that asked a question.
    /// Evaluated answers are attributed to it until the next question replaces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_question: Option<usize>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            current_stage: InterviewStage::Greeting,
            questions_asked: 0,
            performance_level: PerformanceLevel::Medium,
            skill_gaps: Vec::new(),
            strong_areas: Vec::new(),
            pending_question: None,
        }
    }
}

/// An interview session with one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub token: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub resume_path: Option<String>,
    pub parsed_resume_data: Option<ResumeProfile>,
    pub status: SessionStatus,
    pub current_stage: InterviewStage,
    pub conversation_history: Vec<ConversationTurn>,
    pub agent_state: AgentState,
    pub cheating_score: u32,
    pub cheating_events: Vec<CheatingEvent>,
    pub score: Option<f64>,
    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub evaluation_report: Option<String>,
    pub camera_enabled: bool,
    pub microphone_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewSession {
    /// Create a new session in CREATED status with a fresh random token.
    pub fn new(
        candidate_name: impl Into<String>,
        candidate_email: impl Into<String>,
        candidate_phone: Option<String>,
    ) -> CoreResult<Self> {
        let candidate_name = candidate_name.into().trim().to_string();
        let candidate_email = candidate_email.into().trim().to_string();

        if candidate_name.is_empty() {
            return Err(CoreError::validation("candidate name is required"));
        }
        if !is_plausible_email(&candidate_email) {
            return Err(CoreError::validation(format!(
                "invalid candidate email: {}",
                candidate_email
            )));
        }

        Ok(Self {
            token: uuid::Uuid::new_v4().to_string(),
            candidate_name,
            candidate_email,
            candidate_phone: candidate_phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            resume_path: None,
            parsed_resume_data: None,
            status: SessionStatus::Created,
            current_stage: InterviewStage::Greeting,
            conversation_history: Vec::new(),
            agent_state: AgentState::default(),
            cheating_score: 0,
            cheating_events: Vec::new(),
            score: None,
            technical_score: None,
            communication_score: None,
            evaluation_report: None,
            camera_enabled: false,
            microphone_enabled: false,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        })
    }

    /// Reject the operation unless the session is in `expected` status.
    pub fn ensure_status(&self, expected: SessionStatus, operation: &str) -> CoreResult<()> {
        if self.status != expected {
            return Err(CoreError::invalid_state(format!(
                "{} requires status {}, session {} is {}",
                operation, expected, self.token, self.status
            )));
        }
        Ok(())
    }

    /// CREATED -> IN_PROGRESS. Permission flags and `started_at` are set here and
    /// nowhere else.
    pub fn mark_started(&mut self, camera_enabled: bool, microphone_enabled: bool) -> CoreResult<()> {
        self.ensure_status(SessionStatus::Created, "start")?;
        self.status = SessionStatus::InProgress;
        self.started_at = Some(Utc::now());
        self.camera_enabled = camera_enabled;
        self.microphone_enabled = microphone_enabled;
        Ok(())
    }

    /// IN_PROGRESS -> COMPLETED. Returns false when nothing changed.
    pub fn mark_completed(&mut self) -> bool {
        if self.status != SessionStatus::InProgress {
            return false;
        }
        self.status = SessionStatus::Completed;
        self.completed_at.get_or_insert_with(Utc::now);
        true
    }

    /// IN_PROGRESS -> TERMINATED. Returns false when nothing changed, so callers
    /// can run termination side effects exactly once.
    pub fn mark_terminated(&mut self) -> bool {
        if self.status != SessionStatus::InProgress {
            return false;
        }
        self.status = SessionStatus::Terminated;
        self.completed_at.get_or_insert_with(Utc::now);
        true
    }

    /// Append to the inline cheating mirror and bump the score.
    pub fn record_cheating_event(&mut self, event: CheatingEvent) -> u32 {
        self.cheating_events.push(event);
        self.cheating_score += 1;
        self.cheating_score
    }

    /// Move both stage fields together.
    pub fn set_stage(&mut self, stage: InterviewStage) {
        self.current_stage = stage;
        self.agent_state.current_stage = stage;
    }

    /// Whole minutes between start and completion, 0 if either is missing.
    pub fn elapsed_minutes(&self) -> i64 {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => (end - start).num_minutes().max(0),
            _ => 0,
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

pub(crate) fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}
