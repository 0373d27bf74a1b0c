//! Session Commands
//!
//! Read-only views over stored interview sessions.

use std::fmt::Write as _;

use interview_agent_core::{CheatingEvent, InterviewSession, Question, SessionStatus, TurnRole};

use crate::state::AppState;
use crate::utils::error::AppResult;

/// Render one session with its scored questions and cheating log.
pub fn show_session(state: &AppState, token: &str) -> AppResult<String> {
    let agent = state.agent();
    let session = agent.get_session(token)?;
    let questions = agent.questions(token)?;
    let events = agent.cheating_events(token)?;
    Ok(render_session(&session, &questions, &events))
}

/// Render all sessions, newest first, optionally filtered by status.
pub fn list_sessions(state: &AppState, status: Option<&str>) -> AppResult<String> {
    let status = status.map(str::parse::<SessionStatus>).transpose()?;
    let sessions = state.agent().list_sessions(status)?;
    Ok(render_session_list(&sessions))
}

fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{:.1}", s))
}

pub fn render_session(
    session: &InterviewSession,
    questions: &[Question],
    events: &[CheatingEvent],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session {}", session.token);
    let _ = writeln!(
        out,
        "Candidate: {} <{}>",
        session.candidate_name, session.candidate_email
    );
    let _ = writeln!(
        out,
        "Status: {}  Stage: {}  Performance: {}",
        session.status, session.current_stage, session.agent_state.performance_level
    );
    let _ = writeln!(
        out,
        "Questions asked: {}  Cheating score: {}",
        session.agent_state.questions_asked, session.cheating_score
    );
    let _ = writeln!(
        out,
        "Scores: overall {}  technical {}  communication {}",
        fmt_score(session.score),
        fmt_score(session.technical_score),
        fmt_score(session.communication_score)
    );

    if !questions.is_empty() {
        let _ = writeln!(out, "\nScored answers:");
        for (i, q) in questions.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. [{}] {} -> {}",
                i + 1,
                q.category,
                q.question_text,
                fmt_score(q.score)
            );
        }
    }

    if !events.is_empty() {
        let _ = writeln!(out, "\nCheating events:");
        for event in events {
            let _ = writeln!(
                out,
                "  {} {}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                event.event_type
            );
        }
    }

    if !session.conversation_history.is_empty() {
        let _ = writeln!(out, "\nTranscript:");
        for turn in &session.conversation_history {
            let speaker = match turn.role {
                TurnRole::User => "Candidate",
                TurnRole::Assistant => "Interviewer",
            };
            let _ = writeln!(out, "  {}: {}", speaker, turn.content);
        }
    }

    if let Some(report) = &session.evaluation_report {
        let _ = writeln!(out, "\nEvaluation:\n{}", report);
    }

    out
}

pub fn render_session_list(sessions: &[InterviewSession]) -> String {
    if sessions.is_empty() {
        return "No sessions.\n".to_string();
    }

    let mut out = String::new();
    for s in sessions {
        let _ = writeln!(
            out,
            "{}  {:<11}  {:<9}  {}  {}",
            s.token,
            s.status.as_str(),
            s.current_stage.as_str(),
            fmt_score(s.score),
            s.candidate_name
        );
    }
    out
}
