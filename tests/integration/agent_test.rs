//! Interview Agent Integration Tests
//!
//! Full turns through the agent: prompt, scripted backend, interpretation,
//! state updates and persistence in in-memory SQLite.

use std::sync::Arc;

use serde_json::json;

use interview_agent::models::settings::AgentSettings;
use interview_agent::AppError;
use interview_agent_core::{
    DecisionAction, InterviewStage, PerformanceLevel, QuestionCategory, SessionStatus, TurnRole,
    BACKEND_UNAVAILABLE_MESSAGE,
};
use interview_agent_llm::MessageRole;

use crate::support::{ask, create_agent, create_agent_with, started_session, MockLlmProvider};

// ============================================================================
// Start
// ============================================================================

#[tokio::test]
async fn test_start_sends_greeting_instruction() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Hello Ada! What drew you to engineering?").await;

    let session = agent.get_session(&token).unwrap();
    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(session.started_at.is_some());
    assert!(session.camera_enabled);
    assert!(session.microphone_enabled);
    assert_eq!(session.conversation_history.len(), 2);
    assert_eq!(session.current_stage, InterviewStage::Personal);
    assert_eq!(session.agent_state.questions_asked, 1);

    let request = mock.last_request();
    assert_eq!(request.messages.len(), 1);
    assert!(request.messages[0]
        .content
        .starts_with("Start the interview by greeting Ada Lovelace warmly."));
    assert_eq!(request.max_tokens, Some(1000));
    let system = request.system.unwrap();
    assert!(system.contains("CURRENT INTERVIEW STAGE: greeting"));
    assert!(!system.contains("ANTI-CHEATING ALERT"));
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "First question?").await;

    let err = agent.start(&token, false, false).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSessionState(_)));
    assert!(agent.get_session(&token).unwrap().camera_enabled);
}

#[tokio::test]
async fn test_start_survives_backend_failure() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let session = agent
        .create_session("Ada", "ada@example.com", None)
        .await
        .unwrap();
    mock.push_network_error();

    let decision = agent.start(&session.token, false, true).await.unwrap();
    assert_eq!(decision.message, BACKEND_UNAVAILABLE_MESSAGE);

    let stored = agent.get_session(&session.token).unwrap();
    assert_eq!(stored.status, SessionStatus::InProgress);
    assert!(stored.conversation_history.is_empty());
}

// ============================================================================
// process_message
// ============================================================================

#[tokio::test]
async fn test_process_message_appends_exactly_two_turns() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Tell me about yourself.").await;
    let before = agent.get_session(&token).unwrap().conversation_history.len();

    mock.push_text(&ask("What motivates you?", "personal").to_string());
    let decision = agent
        .process_message(&token, "I build compilers.")
        .await
        .unwrap();
    assert_eq!(decision.message, "What motivates you?");

    let session = agent.get_session(&token).unwrap();
    assert_eq!(session.conversation_history.len(), before + 2);
    let user = &session.conversation_history[before];
    let assistant = &session.conversation_history[before + 1];
    assert_eq!(user.role, TurnRole::User);
    assert_eq!(user.content, "I build compilers.");
    assert_eq!(assistant.role, TurnRole::Assistant);
    assert_eq!(assistant.content, "What motivates you?");
    assert_eq!(
        assistant.metadata.as_ref().unwrap().action,
        DecisionAction::AskQuestion
    );
}

#[tokio::test]
async fn test_scored_answer_creates_question_and_sets_high_performance() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "What is your greatest strength?").await;

    mock.push_text(
        &json!({
            "message": "Great. How do you handle setbacks?",
            "evaluation": {"score": 9, "feedback": "good"}
        })
        .to_string(),
    );
    agent
        .process_message(&token, "I am persistent.")
        .await
        .unwrap();

    let questions = agent.questions(&token).unwrap();
    assert_eq!(questions.len(), 1);
    let q = &questions[0];
    assert_eq!(q.question_text, "What is your greatest strength?");
    assert_eq!(q.answer_text, "I am persistent.");
    assert_eq!(q.score, Some(9.0));
    assert_eq!(q.feedback.as_deref(), Some("good"));
    assert_eq!(q.category, QuestionCategory::Personal);

    let session = agent.get_session(&token).unwrap();
    assert_eq!(session.agent_state.performance_level, PerformanceLevel::High);
    assert_eq!(session.agent_state.questions_asked, 2);
    assert!(session.agent_state.questions_asked as usize >= questions.len());
}

#[tokio::test]
async fn test_every_evaluated_answer_is_recorded() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Why this role?").await;

    let evaluate = |message: &str, score: u32| {
        json!({
            "message": message,
            "action": "evaluate",
            "evaluation": {"score": score, "feedback": "ok"}
        })
        .to_string()
    };
    mock.push_text(&evaluate("Can you elaborate?", 7));
    mock.push_text(&evaluate("Thanks for sharing.", 3));
    agent.process_message(&token, "Growth.").await.unwrap();
    agent.process_message(&token, "And mentoring.").await.unwrap();

    // Each answer maps to exactly one question, the last one asked
    let questions = agent.questions(&token).unwrap();
    assert_eq!(questions.len(), 2);
    assert!(questions.iter().all(|q| q.question_text == "Why this role?"));
    assert_eq!(questions[0].answer_text, "Growth.");
    assert_eq!(questions[0].score, Some(7.0));
    assert_eq!(questions[1].answer_text, "And mentoring.");
    assert_eq!(questions[1].score, Some(3.0));

    let session = agent.get_session(&token).unwrap();
    // The latest score alone decides the level
    assert_eq!(session.agent_state.performance_level, PerformanceLevel::Low);
    assert_eq!(session.agent_state.questions_asked, 1);
}

#[tokio::test]
async fn test_malformed_reply_falls_back_to_raw_text() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Where are you based?").await;

    mock.push_text("not json at all");
    let decision = agent.process_message(&token, "Berlin.").await.unwrap();

    assert_eq!(decision.action, DecisionAction::AskQuestion);
    assert_eq!(decision.message, "not json at all");
    assert_eq!(decision.stage, InterviewStage::Personal);

    let session = agent.get_session(&token).unwrap();
    assert_eq!(session.conversation_history.last().unwrap().content, "not json at all");
    assert_eq!(session.agent_state.questions_asked, 2);
}

#[tokio::test]
async fn test_json_wrapped_in_prose_is_understood() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Which project are you proudest of?").await;

    mock.push_text(
        "Sure! Here is my reply:\n```json\n{\"message\": \"Let's talk tech. What is a mutex?\", \
         \"stage\": \"resume\", \"action\": \"progress_stage\", \"next_stage\": \"technical\"}\n```",
    );
    let decision = agent.process_message(&token, "The parser.").await.unwrap();
    assert_eq!(decision.action, DecisionAction::ProgressStage);

    let session = agent.get_session(&token).unwrap();
    assert_eq!(session.current_stage, InterviewStage::Technical);
    assert_eq!(session.agent_state.current_stage, InterviewStage::Technical);
    assert_eq!(session.agent_state.questions_asked, 1);
}

#[tokio::test]
async fn test_backend_failure_changes_nothing() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "What are your goals?").await;
    let before = agent.get_session(&token).unwrap();

    mock.push_network_error();
    let decision = agent.process_message(&token, "To lead a team.").await.unwrap();

    assert_eq!(decision.action, DecisionAction::AskQuestion);
    assert_eq!(decision.message, BACKEND_UNAVAILABLE_MESSAGE);
    assert_eq!(decision.stage, InterviewStage::Personal);

    let after = agent.get_session(&token).unwrap();
    assert_eq!(after.agent_state.questions_asked, before.agent_state.questions_asked);
    assert_eq!(after.conversation_history.len(), before.conversation_history.len());
    assert!(after
        .conversation_history
        .iter()
        .all(|turn| !turn.content.is_empty()));
}

#[tokio::test]
async fn test_process_message_rejected_outside_in_progress() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());

    // CREATED
    let created = agent
        .create_session("Ada", "ada@example.com", None)
        .await
        .unwrap();
    let err = agent.process_message(&created.token, "hi").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSessionState(_)));
    assert!(agent
        .get_session(&created.token)
        .unwrap()
        .conversation_history
        .is_empty());

    // COMPLETED
    let token = started_session(&agent, &mock, "Any questions for us?").await;
    mock.push_text(
        &json!({"message": "Thank you, goodbye!", "stage": "closing", "action": "conclude"})
            .to_string(),
    );
    agent.process_message(&token, "No, thanks.").await.unwrap();
    let completed = agent.get_session(&token).unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
    assert!(completed.completed_at.is_some());

    let err = agent.process_message(&token, "One more thing").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSessionState(_)));
    assert_eq!(
        agent.get_session(&token).unwrap().conversation_history.len(),
        completed.conversation_history.len()
    );

    // No backend call was made for rejected messages
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_blank_message_is_a_validation_error() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Hello?").await;

    let err = agent.process_message(&token, "   \n").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(agent.get_session(&token).unwrap().conversation_history.len(), 2);
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock);
    let err = agent.process_message("missing", "hi").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(matches!(
        agent.start("missing", true, true).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        agent.generate_final_evaluation("missing").await,
        Err(AppError::NotFound(_))
    ));
    assert!(!agent.delete_session("missing").await.unwrap());

    // Unknown tokens leave no lock entries behind
    assert_eq!(agent.locked_sessions(), 0);
}

#[tokio::test]
async fn test_deleted_session_releases_its_lock_entry() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Hello?").await;
    assert_eq!(agent.locked_sessions(), 1);

    assert!(agent.delete_session(&token).await.unwrap());
    assert_eq!(agent.locked_sessions(), 0);
    assert!(matches!(
        agent.process_message(&token, "hi").await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(agent.locked_sessions(), 0);
}

// ============================================================================
// Prompt context
// ============================================================================

#[tokio::test]
async fn test_prompt_window_is_capped() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let settings = AgentSettings {
        history_window: 4,
        ..AgentSettings::default()
    };
    let agent = create_agent_with(mock.clone(), settings);
    let token = started_session(&agent, &mock, "Q1").await;

    for i in 2..=4 {
        mock.push_text(&ask(&format!("Q{}", i), "personal").to_string());
        agent
            .process_message(&token, &format!("A{}", i - 1))
            .await
            .unwrap();
    }

    let request = mock.last_request();
    let contents: Vec<&str> = request.messages.iter().map(|m| m.content.as_str()).collect();
    // History before the last call: greeting, Q1, A1, Q2, A2, Q3, A3
    assert_eq!(contents, vec!["A2", "Q3", "A3"]);
    assert_eq!(request.messages[0].role, MessageRole::User);
    assert!(request.system.unwrap().contains("QUESTIONS ASKED SO FAR: 3"));
}

#[tokio::test]
async fn test_prompt_reflects_performance_and_cheating() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "Explain ownership.").await;

    agent
        .log_cheating_event(
            &token,
            interview_agent_core::CheatingEventType::TabSwitch,
            Default::default(),
        )
        .await
        .unwrap();

    mock.push_text(
        &json!({"message": "Hmm. What about borrowing?", "evaluation": {"score": 2}}).to_string(),
    );
    agent.process_message(&token, "No idea.").await.unwrap();
    mock.push_text(&ask("Try again?", "technical").to_string());
    agent.process_message(&token, "Still no idea.").await.unwrap();

    let system = mock.last_request().system.unwrap();
    assert!(system.contains("PERFORMANCE LEVEL: low"));
    assert!(system.contains("ANTI-CHEATING ALERT: 1 violations detected."));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_messages_are_serialized() {
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let token = started_session(&agent, &mock, "First?").await;

    for i in 0..8 {
        mock.push_text(&ask(&format!("Follow-up {}", i), "personal").to_string());
    }

    let mut handles = Vec::new();
    for i in 0..8 {
        let agent = agent.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            agent.process_message(&token, &format!("answer {}", i)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let session = agent.get_session(&token).unwrap();
    assert_eq!(session.conversation_history.len(), 2 + 8 * 2);
    assert_eq!(session.agent_state.questions_asked, 9);
    for pair in session.conversation_history.chunks(2) {
        assert_eq!(pair[0].role, TurnRole::User);
        assert_eq!(pair[1].role, TurnRole::Assistant);
    }
}
