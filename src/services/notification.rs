//! Candidate Notifications
//!
//! Invitation and report notices are fire-and-forget: they are dispatched on a
//! spawned task after the state change is committed, and a failed send is only
//! logged.

use std::sync::Arc;

use async_trait::async_trait;
use interview_agent_core::InterviewSession;
use tracing::{info, warn};

use crate::utils::error::AppResult;

/// Delivery channel for candidate-facing notices
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the candidate their interview is ready.
    async fn send_invitation(&self, session: &InterviewSession) -> AppResult<()>;

    /// Deliver the final evaluation.
    async fn send_report(&self, session: &InterviewSession) -> AppResult<()>;
}

/// Notifier that only records the send in the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_invitation(&self, session: &InterviewSession) -> AppResult<()> {
        info!(
            token = %session.token,
            email = %session.candidate_email,
            "interview invitation issued"
        );
        Ok(())
    }

    async fn send_report(&self, session: &InterviewSession) -> AppResult<()> {
        info!(
            token = %session.token,
            email = %session.candidate_email,
            score = ?session.score,
            "evaluation report issued"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Notice {
    Invitation,
    Report,
}

/// Send `notice` in the background. Must be called from within a tokio runtime.
pub(crate) fn dispatch(notifier: Arc<dyn Notifier>, notice: Notice, session: InterviewSession) {
    tokio::spawn(async move {
        let result = match notice {
            Notice::Invitation => notifier.send_invitation(&session).await,
            Notice::Report => notifier.send_report(&session).await,
        };
        if let Err(e) = result {
            warn!(token = %session.token, notice = ?notice, error = %e, "notification failed");
        }
    });
}
