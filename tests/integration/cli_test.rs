//! Command Handler Integration Tests
//!
//! Drives the terminal interview loop with scripted input.

use std::io::Cursor;
use std::sync::Arc;

use serde_json::json;

use interview_agent::commands;
use interview_agent::{AppConfig, AppState, Database};
use interview_agent_core::SessionStatus;

use crate::support::{ask, MockLlmProvider};

fn state_with(mock: Arc<MockLlmProvider>) -> AppState {
    AppState::from_parts(AppConfig::default(), Database::new_in_memory().unwrap(), mock).unwrap()
}

#[tokio::test]
async fn test_run_interview_to_conclusion() {
    let mock = Arc::new(MockLlmProvider::with_decisions(vec![
        ask("Hi Ada, tell me about yourself.", "personal"),
        json!({
            "message": "Thanks, that is all for today.",
            "stage": "closing",
            "action": "conclude",
            "evaluation": {"score": 9, "feedback": "articulate"}
        }),
    ]));
    mock.push_text("Excellent communicator.\nHiring Recommendation: Strong Yes");
    let state = state_with(mock.clone());

    let session = commands::create_session(&state, "Ada Lovelace", "ada@example.com", None, None)
        .await
        .unwrap();

    let input = Cursor::new("\nI write analytical engines.\n");
    let mut output = Vec::new();
    let finished = commands::run_interview(&state, &session.token, true, false, input, &mut output)
        .await
        .unwrap();

    let transcript = String::from_utf8(output).unwrap();
    assert!(transcript.contains("Interviewer: Hi Ada, tell me about yourself."));
    assert!(transcript.contains("Interviewer: Thanks, that is all for today."));
    assert!(transcript.contains("Interview completed."));
    assert!(transcript.contains("Hiring Recommendation: Strong Yes"));

    assert_eq!(finished.status, SessionStatus::Completed);
    assert_eq!(finished.score, Some(9.0));
    assert!(finished.camera_enabled);
    assert!(!finished.microphone_enabled);
    // Blank input lines are skipped, not sent
    assert_eq!(mock.requests().len(), 3);

    let shown = commands::show_session(&state, &session.token).unwrap();
    assert!(shown.contains("Ada Lovelace"));
    assert!(shown.contains("COMPLETED"));
}

#[tokio::test]
async fn test_run_interview_pauses_at_end_of_input() {
    let mock = Arc::new(MockLlmProvider::with_decisions(vec![
        ask("Welcome! Ready?", "greeting"),
        ask("What drew you to this role?", "personal"),
    ]));
    let state = state_with(mock.clone());
    let session = commands::create_session(&state, "Ada", "ada@example.com", None, None)
        .await
        .unwrap();

    let mut output = Vec::new();
    let paused = commands::run_interview(
        &state,
        &session.token,
        false,
        false,
        Cursor::new("Yes.\n"),
        &mut output,
    )
    .await
    .unwrap();

    let transcript = String::from_utf8(output).unwrap();
    assert!(transcript.contains("Interview paused"));
    assert_eq!(paused.status, SessionStatus::InProgress);
    assert!(paused.evaluation_report.is_none());

    let listed = commands::list_sessions(&state, Some("IN_PROGRESS")).unwrap();
    assert!(listed.contains(&session.token));
    assert!(commands::list_sessions(&state, Some("BOGUS")).is_err());
}

#[tokio::test]
async fn test_cheat_command_terminates_session() {
    let mock = Arc::new(MockLlmProvider::with_decisions(vec![ask("Hello!", "greeting")]));
    let state = state_with(mock.clone());
    let session = commands::create_session(&state, "Ada", "ada@example.com", None, None)
        .await
        .unwrap();
    let mut output = Vec::new();
    commands::run_interview(&state, &session.token, true, true, Cursor::new(""), &mut output)
        .await
        .unwrap();

    let threshold = state.config().agent.cheating_threshold;
    let mut last = None;
    for i in 0..threshold {
        let meta = vec![format!("attempt={}", i)];
        last = Some(
            commands::log_cheating_event(&state, &session.token, "TAB_SWITCH", &meta)
                .await
                .unwrap(),
        );
    }
    let last = last.unwrap();
    assert!(last.terminated_now);
    assert_eq!(last.status, SessionStatus::Terminated);

    let err = commands::log_cheating_event(&state, &session.token, "NOT_AN_EVENT", &[])
        .await
        .unwrap_err();
    assert!(err.to_string().to_lowercase().contains("not_an_event"));
}
