//! Final Evaluation
//!
//! Aggregates the scored questions of a finished interview and asks the
//! backend for a narrative report.

use interview_agent_core::{InterviewSession, Question, SessionStatus};
use interview_agent_llm::{LlmRequestOptions, Message};
use tracing::{info, warn};

use super::agent::InterviewAgent;
use super::prompt::{evaluation_prompt, EVALUATION_SYSTEM_PROMPT};
use crate::services::notification::{dispatch, Notice};
use crate::utils::error::{AppError, AppResult};

/// Report stored when the backend could not write one
pub const EVALUATION_FAILED_NOTICE: &str =
    "Evaluation report generation failed. Please review manually.";

/// Numeric part of the final evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub total_questions: usize,
    /// Mean of all scored answers, 0 when nothing was scored
    pub average: f64,
    /// Mean over scored TECHNICAL and CODING answers, None when none is scored
    pub technical: Option<f64>,
    /// Mean over scored PERSONAL and BEHAVIORAL answers, None when none is scored
    pub communication: Option<f64>,
}

impl ScoreSummary {
    pub fn from_questions(questions: &[Question]) -> Self {
        let scores = |filter: fn(&Question) -> bool| -> Vec<f64> {
            questions
                .iter()
                .filter(|q| filter(q))
                .filter_map(|q| q.score)
                .collect()
        };

        let all = scores(|_| true);
        let average = all.iter().sum::<f64>() / all.len().max(1) as f64;

        Self {
            total_questions: questions.len(),
            average,
            technical: mean(&scores(|q| q.category.is_technical())),
            communication: mean(&scores(|q| q.category.is_communication())),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl InterviewAgent {
    /// Score a finished interview and store the narrative report.
    ///
    /// Scores are written even when the backend fails; the report then holds
    /// a fixed notice asking for manual review.
    pub async fn generate_final_evaluation(&self, token: &str) -> AppResult<InterviewSession> {
        let (_guard, mut session) = self.lock_session(token).await?;
        if !matches!(
            session.status,
            SessionStatus::Completed | SessionStatus::Terminated
        ) {
            return Err(AppError::invalid_state(format!(
                "evaluation requires a finished interview, session {} is {}",
                token, session.status
            )));
        }

        let questions = self.store.get_questions(token)?;
        let summary = ScoreSummary::from_questions(&questions);

        let prompt = evaluation_prompt(
            &session.candidate_name,
            summary.total_questions,
            summary.average,
            session.cheating_score,
            session.elapsed_minutes(),
        );
        let options = LlmRequestOptions::with_max_tokens(self.settings.evaluation_max_tokens);
        let report = match self
            .backend
            .complete(EVALUATION_SYSTEM_PROMPT, vec![Message::user(prompt)], options)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(token = %token, "backend returned an empty evaluation report");
                EVALUATION_FAILED_NOTICE.to_string()
            }
            Err(e) => {
                warn!(token = %token, error = %e, "evaluation report generation failed");
                EVALUATION_FAILED_NOTICE.to_string()
            }
        };

        session.score = Some(summary.average);
        session.technical_score = summary.technical;
        session.communication_score = summary.communication;
        session.evaluation_report = Some(report);
        self.store.save_session(&session)?;

        info!(
            token = %token,
            questions = summary.total_questions,
            score = summary.average,
            "final evaluation written"
        );
        dispatch(self.notifier.clone(), Notice::Report, session.clone());

        Ok(session)
    }
}
