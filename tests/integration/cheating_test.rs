//! Anti-Cheating Integration Tests
//!
//! Counter consistency across the session row, the inline mirror and the
//! event table, and one-shot termination at the threshold.

use std::sync::Arc;

use serde_json::json;

use interview_agent::models::settings::AgentSettings;
use interview_agent::AppError;
use interview_agent_core::{CheatingEventType, EventMetadata, SessionStatus};

use crate::support::{create_agent, create_agent_with, started_session, MockLlmProvider};

fn metadata(pairs: &[(&str, &str)]) -> EventMetadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect()
}

#[tokio::test]
async fn test_score_matches_events_after_every_call() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Hello?").await;

    for (i, event_type) in CheatingEventType::ALL.iter().take(4).enumerate() {
        let n = i.to_string();
        let outcome = agent
            .log_cheating_event(&token, *event_type, metadata(&[("n", n.as_str())]))
            .await
            .unwrap();

        let session = agent.get_session(&token).unwrap();
        let rows = agent.cheating_events(&token).unwrap();
        assert_eq!(outcome.cheating_score, (i + 1) as u32);
        assert_eq!(session.cheating_score, outcome.cheating_score);
        assert_eq!(session.cheating_events.len(), session.cheating_score as usize);
        assert_eq!(rows.len(), session.cheating_score as usize);
        assert_eq!(agent.store().count_cheating_events(&token).unwrap(), session.cheating_score);
    }

    let rows = agent.cheating_events(&token).unwrap();
    assert_eq!(rows[0].event_type, CheatingEventType::TabSwitch);
    assert_eq!(rows[0].metadata["n"], "0");
    assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_threshold_terminates_exactly_once() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let settings = AgentSettings {
        cheating_threshold: 3,
        ..AgentSettings::default()
    };
    let agent = create_agent_with(mock.clone(), settings);
    let token = started_session(&agent, &mock, "Hello?").await;

    let mut terminations = 0;
    for _ in 0..6 {
        let outcome = agent
            .log_cheating_event(&token, CheatingEventType::WindowBlur, EventMetadata::new())
            .await
            .unwrap();
        if outcome.terminated_now {
            terminations += 1;
            assert_eq!(outcome.cheating_score, 3);
        }
        if outcome.cheating_score >= 3 {
            assert_eq!(outcome.status, SessionStatus::Terminated);
        } else {
            assert_eq!(outcome.status, SessionStatus::InProgress);
        }
    }
    assert_eq!(terminations, 1);

    let session = agent.get_session(&token).unwrap();
    assert_eq!(session.status, SessionStatus::Terminated);
    assert_eq!(session.cheating_score, 6);
    assert_eq!(agent.cheating_events(&token).unwrap().len(), 6);
    assert!(session.completed_at.is_some());
}

#[tokio::test]
async fn test_terminated_session_rejects_messages() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let settings = AgentSettings {
        cheating_threshold: 1,
        ..AgentSettings::default()
    };
    let agent = create_agent_with(mock.clone(), settings);
    let token = started_session(&agent, &mock, "Hello?").await;

    agent
        .log_cheating_event(&token, CheatingEventType::MultipleFaces, EventMetadata::new())
        .await
        .unwrap();
    let history_len = agent.get_session(&token).unwrap().conversation_history.len();

    let err = agent.process_message(&token, "Sorry!").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSessionState(_)));
    assert_eq!(
        agent.get_session(&token).unwrap().conversation_history.len(),
        history_len
    );
}

#[tokio::test]
async fn test_events_before_start_are_recorded_without_termination() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let settings = AgentSettings {
        cheating_threshold: 2,
        ..AgentSettings::default()
    };
    let agent = create_agent_with(mock.clone(), settings);
    let session = agent
        .create_session("Ada", "ada@example.com", None)
        .await
        .unwrap();

    for _ in 0..2 {
        let outcome = agent
            .log_cheating_event(&session.token, CheatingEventType::CameraOff, EventMetadata::new())
            .await
            .unwrap();
        assert!(!outcome.terminated_now);
        assert_eq!(outcome.status, SessionStatus::Created);
    }
    assert_eq!(agent.get_session(&session.token).unwrap().cheating_score, 2);
}

#[tokio::test]
async fn test_start_terminates_when_threshold_already_reached() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let settings = AgentSettings {
        cheating_threshold: 2,
        ..AgentSettings::default()
    };
    let agent = create_agent_with(mock.clone(), settings);
    let session = agent
        .create_session("Ada", "ada@example.com", None)
        .await
        .unwrap();

    for _ in 0..3 {
        agent
            .log_cheating_event(&session.token, CheatingEventType::TabSwitch, EventMetadata::new())
            .await
            .unwrap();
    }

    mock.push_text(r#"{"message": "Welcome!", "action": "ask_question"}"#);
    let err = agent.start(&session.token, true, true).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSessionState(_)));
    // No greeting turn was requested
    assert!(mock.requests().is_empty());

    let stored = agent.get_session(&session.token).unwrap();
    assert_eq!(stored.status, SessionStatus::Terminated);
    assert_eq!(stored.cheating_score, 3);
    assert!(stored.conversation_history.is_empty());
    assert!(stored.completed_at.is_some());

    let err = agent.process_message(&session.token, "Hello?").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSessionState(_)));
    assert!(agent.start(&session.token, true, true).await.is_err());
}

#[tokio::test]
async fn test_start_below_threshold_runs_normally() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let settings = AgentSettings {
        cheating_threshold: 2,
        ..AgentSettings::default()
    };
    let agent = create_agent_with(mock.clone(), settings);
    let session = agent
        .create_session("Ada", "ada@example.com", None)
        .await
        .unwrap();
    agent
        .log_cheating_event(&session.token, CheatingEventType::WindowBlur, EventMetadata::new())
        .await
        .unwrap();

    mock.push_text(r#"{"message": "Welcome!", "action": "ask_question"}"#);
    agent.start(&session.token, true, true).await.unwrap();
    assert_eq!(
        agent.get_session(&session.token).unwrap().status,
        SessionStatus::InProgress
    );

    let outcome = agent
        .log_cheating_event(&session.token, CheatingEventType::WindowBlur, EventMetadata::new())
        .await
        .unwrap();
    assert!(outcome.terminated_now);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_events_keep_counts_consistent() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let settings = AgentSettings {
        cheating_threshold: 10,
        ..AgentSettings::default()
    };
    let agent = create_agent_with(mock.clone(), settings);
    let token = started_session(&agent, &mock, "Hello?").await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let agent = agent.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            agent
                .log_cheating_event(&token, CheatingEventType::CopyPaste, EventMetadata::new())
                .await
        }));
    }

    let mut terminations = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().terminated_now {
            terminations += 1;
        }
    }

    let session = agent.get_session(&token).unwrap();
    assert_eq!(terminations, 1);
    assert_eq!(session.cheating_score, 20);
    assert_eq!(session.cheating_events.len(), 20);
    assert_eq!(agent.cheating_events(&token).unwrap().len(), 20);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock);
    let err = agent
        .log_cheating_event("missing", CheatingEventType::NoFace, EventMetadata::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(agent.locked_sessions(), 0);
}
