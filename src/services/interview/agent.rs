//! Interview Agent
//!
//! The per-session state machine. Every mutating operation runs under the
//! session's lock: load the session, apply the change, commit, release.
//!
//! ```text
//! CREATED --start--> IN_PROGRESS --conclude--> COMPLETED
//!                         |
//!                         +--cheating threshold--> TERMINATED
//! ```

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use interview_agent_core::{
    interpret, CheatingEvent, CheatingEventType, ConversationTurn, Decision, EventMetadata,
    Interpretation, InterviewSession, PerformanceLevel, Question, QuestionCategory,
    ResumeProfile, SessionStatus,
};
use interview_agent_llm::{LlmProvider, LlmRequestOptions};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use super::locks::SessionLocks;
use super::prompt::{build_prompt, greeting_instruction};
use crate::models::settings::AgentSettings;
use crate::services::notification::{dispatch, LogNotifier, Notice, Notifier};
use crate::services::resume::ResumeParser;
use crate::storage::SessionStore;
use crate::utils::error::{AppError, AppResult};

/// Result of logging one cheating event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheatingOutcome {
    pub cheating_score: u32,
    pub status: SessionStatus,
    /// True only for the call that crossed the threshold
    pub terminated_now: bool,
}

/// LLM-driven interviewer over a session store
#[derive(Clone)]
pub struct InterviewAgent {
    pub(super) store: SessionStore,
    pub(super) backend: Arc<dyn LlmProvider>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) settings: AgentSettings,
    pub(super) locks: SessionLocks,
    resume_parser: ResumeParser,
}

impl InterviewAgent {
    /// Create an agent. The backend is chosen once by the caller and used for
    /// turns, evaluations and resume structuring alike.
    pub fn new(store: SessionStore, backend: Arc<dyn LlmProvider>, settings: AgentSettings) -> Self {
        let resume_parser = ResumeParser::new(Some(backend.clone()), settings.resume_max_tokens);
        Self {
            store,
            backend,
            notifier: Arc::new(LogNotifier),
            settings,
            locks: SessionLocks::new(),
            resume_parser,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_resume_parser(mut self, parser: ResumeParser) -> Self {
        self.resume_parser = parser;
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Lock a stored session and load it under the lock. Unknown tokens never
    /// get a lock entry.
    pub(super) async fn lock_session(
        &self,
        token: &str,
    ) -> AppResult<(OwnedMutexGuard<()>, InterviewSession)> {
        self.store.require_session(token)?;
        let guard = self.locks.acquire(token).await;
        match self.store.require_session(token) {
            Ok(session) => Ok((guard, session)),
            Err(e) => {
                // Deleted while waiting for the lock
                drop(guard);
                self.locks.forget(token);
                Err(e)
            }
        }
    }

    /// Number of sessions with a lock entry
    pub fn locked_sessions(&self) -> usize {
        self.locks.len()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Register a new candidate session in CREATED status and send the
    /// invitation.
    pub async fn create_session(
        &self,
        candidate_name: &str,
        candidate_email: &str,
        candidate_phone: Option<String>,
    ) -> AppResult<InterviewSession> {
        let session = InterviewSession::new(candidate_name, candidate_email, candidate_phone)?;
        self.store.create_session(&session)?;

        info!(token = %session.token, candidate = %session.candidate_name, "interview session created");
        dispatch(self.notifier.clone(), Notice::Invitation, session.clone());
        Ok(session)
    }

    /// Parse the resume at `path` and attach it to a session that has not
    /// finished yet.
    pub async fn attach_resume(&self, token: &str, path: &Path) -> AppResult<ResumeProfile> {
        let (_guard, mut session) = self.lock_session(token).await?;
        if session.status.is_finished() {
            return Err(AppError::invalid_state(format!(
                "cannot attach a resume to session {} in status {}",
                token, session.status
            )));
        }

        let profile = self.resume_parser.parse_file(path).await?;
        session.resume_path = Some(path.display().to_string());
        session.parsed_resume_data = Some(profile.clone());
        self.store.save_session(&session)?;

        debug!(token = %token, skills = profile.skills.len(), "resume attached");
        Ok(profile)
    }

    /// Start the interview and let the agent open it with a greeting.
    pub async fn start(
        &self,
        token: &str,
        camera_enabled: bool,
        microphone_enabled: bool,
    ) -> AppResult<Decision> {
        let (_guard, mut session) = self.lock_session(token).await?;
        session.mark_started(camera_enabled, microphone_enabled)?;

        // Events logged before the start already count against the threshold
        if session.cheating_score >= self.settings.cheating_threshold {
            session.mark_terminated();
            self.store.save_session(&session)?;
            warn!(
                token = %token,
                cheating_score = session.cheating_score,
                threshold = self.settings.cheating_threshold,
                "interview terminated at start for cheating"
            );
            return Err(AppError::invalid_state(format!(
                "session {} is terminated: cheating score {} reached the threshold of {}",
                token, session.cheating_score, self.settings.cheating_threshold
            )));
        }

        // The start itself must survive a failed greeting turn
        self.store.save_session(&session)?;

        info!(
            token = %token,
            camera = camera_enabled,
            microphone = microphone_enabled,
            "interview started"
        );

        let greeting = greeting_instruction(&session.candidate_name);
        self.run_turn(session, &greeting).await
    }

    /// Deliver one candidate message and return the agent's decision.
    pub async fn process_message(&self, token: &str, candidate_text: &str) -> AppResult<Decision> {
        let (_guard, session) = self.lock_session(token).await?;
        session.ensure_status(SessionStatus::InProgress, "process_message")?;

        let text = candidate_text.trim();
        if text.is_empty() {
            return Err(AppError::validation("candidate message must not be empty"));
        }

        self.run_turn(session, text).await
    }

    /// Record an anti-cheating signal. The call that brings the score to the
    /// configured threshold terminates a running interview; later events are
    /// still recorded.
    pub async fn log_cheating_event(
        &self,
        token: &str,
        event_type: CheatingEventType,
        metadata: EventMetadata,
    ) -> AppResult<CheatingOutcome> {
        let (_guard, mut session) = self.lock_session(token).await?;

        let event = CheatingEvent::new(event_type, metadata);
        let cheating_score = session.record_cheating_event(event.clone());
        let terminated_now =
            cheating_score >= self.settings.cheating_threshold && session.mark_terminated();

        self.store.commit_cheating_event(&session, &event)?;

        if terminated_now {
            warn!(
                token = %token,
                cheating_score,
                threshold = self.settings.cheating_threshold,
                "interview terminated for cheating"
            );
        } else {
            debug!(token = %token, event = %event_type.as_str(), cheating_score, "cheating event logged");
        }

        Ok(CheatingOutcome {
            cheating_score,
            status: session.status,
            terminated_now,
        })
    }

    /// Remove a session and its records.
    pub async fn delete_session(&self, token: &str) -> AppResult<bool> {
        if self.store.get_session(token)?.is_none() {
            return Ok(false);
        }
        let deleted = {
            let _guard = self.locks.acquire(token).await;
            self.store.delete_session(token)?
        };
        self.locks.forget(token);
        Ok(deleted)
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn get_session(&self, token: &str) -> AppResult<InterviewSession> {
        self.store.require_session(token)
    }

    pub fn list_sessions(&self, status: Option<SessionStatus>) -> AppResult<Vec<InterviewSession>> {
        self.store.list_sessions(status)
    }

    pub fn questions(&self, token: &str) -> AppResult<Vec<Question>> {
        self.store.get_questions(token)
    }

    pub fn cheating_events(&self, token: &str) -> AppResult<Vec<CheatingEvent>> {
        self.store.get_cheating_events(token)
    }

    // ========================================================================
    // Turn processing
    // ========================================================================

    /// One conversational round trip. The caller holds the session lock and
    /// has checked the status.
    async fn run_turn(&self, mut session: InterviewSession, candidate_text: &str) -> AppResult<Decision> {
        let received_at = Utc::now();
        session
            .conversation_history
            .push(ConversationTurn::user(candidate_text));

        let prompt = build_prompt(&session, self.settings.history_window);
        let stage = session.agent_state.current_stage;
        debug!(
            token = %session.token,
            stage = %stage,
            messages = prompt.messages.len(),
            "requesting next turn"
        );

        let options = LlmRequestOptions::with_max_tokens(self.settings.turn_max_tokens);
        let raw = match self
            .backend
            .complete(&prompt.system, prompt.messages, options)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                let err = AppError::from(e);
                warn!(token = %session.token, error = %err, "backend call failed, interview continues");
                return Ok(Decision::backend_unavailable(stage));
            }
        };

        let Interpretation { decision, error } = interpret(&raw, stage);
        if let Some(err) = error {
            warn!(token = %session.token, error = %err, "model reply did not follow the decision schema");
        }

        let outcome = apply_decision(&mut session, &decision, candidate_text, received_at);
        self.store.commit_turn(&session, outcome.question.as_ref())?;

        debug!(
            token = %session.token,
            action = %decision.action.as_str(),
            stage = %session.agent_state.current_stage,
            questions_asked = session.agent_state.questions_asked,
            scored = outcome.question.is_some(),
            "turn committed"
        );
        if outcome.concluded {
            info!(token = %session.token, "interview concluded");
        }

        Ok(decision)
    }
}

/// What applying a decision produced besides the session mutation
#[derive(Debug, Default)]
pub(crate) struct TurnOutcome {
    pub question: Option<Question>,
    pub concluded: bool,
}

/// Append the assistant turn for `decision` and apply its updates.
///
/// An evaluation is attributed to the pending question, the most recent
/// assistant question. The pointer stays on that question until the next one
/// is asked, so follow-up answers to it are recorded too.
pub(crate) fn apply_decision(
    session: &mut InterviewSession,
    decision: &Decision,
    answer: &str,
    received_at: DateTime<Utc>,
) -> TurnOutcome {
    let mut outcome = TurnOutcome::default();
    let pending = session.agent_state.pending_question;
    let turn_index = session.conversation_history.len();
    session
        .conversation_history
        .push(ConversationTurn::assistant(decision.clone()));

    session.set_stage(decision.stage);

    if decision.is_question() {
        session.agent_state.questions_asked += 1;
    }

    if let Some(evaluation) = &decision.evaluation {
        if let Some(asked) = pending.and_then(|idx| session.conversation_history.get(idx)) {
            // The category belongs to the question as it was asked
            let category = match asked.metadata.as_ref() {
                Some(asked_decision) => asked_decision
                    .question_category
                    .unwrap_or_else(|| QuestionCategory::for_stage(asked_decision.stage)),
                None => decision
                    .question_category
                    .unwrap_or_else(|| QuestionCategory::for_stage(decision.stage)),
            };

            outcome.question = Some(Question::new(
                session.token.clone(),
                asked.content.clone(),
                category,
                asked.timestamp,
                answer,
                received_at,
                evaluation.score,
                evaluation.feedback.clone(),
            ));
        }

        // Latest score only, no smoothing
        session.agent_state.performance_level =
            PerformanceLevel::from_score(evaluation.effective_score());
    }

    if decision.is_question() {
        session.agent_state.pending_question = Some(turn_index);
    }

    if let Some(next) = decision.next_stage {
        session.set_stage(next);
    }

    if decision.concludes() {
        outcome.concluded = session.mark_completed();
    }

    outcome
}
