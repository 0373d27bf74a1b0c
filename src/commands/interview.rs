//! Interview Commands
//!
//! Handlers for creating sessions, running an interview over a line-based
//! terminal, logging cheating events and generating the final evaluation.

use std::io::{BufRead, Write};
use std::path::Path;

use interview_agent_core::{CheatingEventType, EventMetadata, InterviewSession};
use serde_json::Value;

use crate::services::interview::CheatingOutcome;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Create a session and optionally attach a resume.
pub async fn create_session(
    state: &AppState,
    name: &str,
    email: &str,
    phone: Option<String>,
    resume: Option<&Path>,
) -> AppResult<InterviewSession> {
    let agent = state.agent();
    let session = agent.create_session(name, email, phone).await?;
    if let Some(path) = resume {
        agent.attach_resume(&session.token, path).await?;
    }
    agent.get_session(&session.token)
}

/// Run an interview to its end, reading answers from `input` and writing the
/// conversation to `output`.
///
/// Stops when the agent concludes, the session is terminated, or `input` is
/// exhausted. A finished interview is evaluated before returning.
pub async fn run_interview<R: BufRead, W: Write>(
    state: &AppState,
    token: &str,
    camera_enabled: bool,
    microphone_enabled: bool,
    mut input: R,
    mut output: W,
) -> AppResult<InterviewSession> {
    let agent = state.agent();

    let opening = agent.start(token, camera_enabled, microphone_enabled).await?;
    writeln!(output, "Interviewer: {}", opening.message)?;

    let mut line = String::new();
    loop {
        if agent.get_session(token)?.status.is_finished() {
            break;
        }

        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match agent.process_message(token, &line).await {
            Ok(decision) => writeln!(output, "Interviewer: {}", decision.message)?,
            // Terminated by a cheating event logged from elsewhere
            Err(AppError::InvalidSessionState(_)) => break,
            Err(e) => return Err(e),
        }
    }

    let session = agent.get_session(token)?;
    if !session.status.is_finished() {
        writeln!(output, "Interview paused, session {} is {}", token, session.status)?;
        return Ok(session);
    }

    writeln!(output, "Interview {}.", session.status.as_str().to_lowercase())?;
    let evaluated = agent.generate_final_evaluation(token).await?;
    if let Some(report) = &evaluated.evaluation_report {
        writeln!(output, "\n{}", report)?;
    }
    Ok(evaluated)
}

/// Log one cheating event given on the command line.
pub async fn log_cheating_event(
    state: &AppState,
    token: &str,
    event_type: &str,
    meta: &[String],
) -> AppResult<CheatingOutcome> {
    let event_type: CheatingEventType = event_type.parse()?;
    let metadata = parse_metadata(meta)?;
    state
        .agent()
        .log_cheating_event(token, event_type, metadata)
        .await
}

/// Generate (or regenerate) the final evaluation of a finished session.
pub async fn evaluate(state: &AppState, token: &str) -> AppResult<InterviewSession> {
    state.agent().generate_final_evaluation(token).await
}

/// Turn `key=value` pairs into event metadata.
pub fn parse_metadata(pairs: &[String]) -> AppResult<EventMetadata> {
    let mut metadata = EventMetadata::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::validation(format!("metadata must be key=value: {}", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::validation(format!("metadata key is empty: {}", pair)));
        }
        metadata.insert(key.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(metadata)
}
