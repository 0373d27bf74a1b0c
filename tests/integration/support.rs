//! Shared fixtures: a scripted LLM backend and an agent over in-memory SQLite.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use interview_agent::models::settings::AgentSettings;
use interview_agent::services::interview::InterviewAgent;
use interview_agent::storage::{Database, SessionStore};
use interview_agent_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
};

/// One request seen by the mock backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
}

/// Backend that replays queued replies in order and records every request.
pub struct MockLlmProvider {
    responses: Mutex<Vec<LlmResult<LlmResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    config: ProviderConfig,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<LlmResult<LlmResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            config: ProviderConfig::default(),
        }
    }

    /// Queue plain text replies.
    pub fn with_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(LlmResponse::text(t.as_ref(), "mock-model")))
                .collect(),
        )
    }

    /// Queue decision objects serialized as JSON replies.
    pub fn with_decisions(decisions: Vec<Value>) -> Self {
        let texts: Vec<String> = decisions.iter().map(|d| d.to_string()).collect();
        Self::with_texts(&texts)
    }

    pub fn push(&self, response: LlmResult<LlmResponse>) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn push_text(&self, text: &str) {
        self.push(Ok(LlmResponse::text(text, "mock-model")));
    }

    pub fn push_network_error(&self) {
        self.push(Err(LlmError::NetworkError {
            message: "connection reset by peer".to_string(),
        }));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system,
            messages,
            max_tokens: request_options.max_tokens_override,
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(LlmError::Other {
                message: "No more mock responses available".to_string(),
            })
        } else {
            responses.remove(0)
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

pub fn create_store() -> SessionStore {
    let db = Database::new_in_memory().unwrap();
    SessionStore::new(db).unwrap()
}

pub fn create_agent(mock: Arc<MockLlmProvider>) -> InterviewAgent {
    create_agent_with(mock, AgentSettings::default())
}

pub fn create_agent_with(mock: Arc<MockLlmProvider>, settings: AgentSettings) -> InterviewAgent {
    InterviewAgent::new(create_store(), mock, settings)
}

/// JSON decision asking a question in `stage`.
pub fn ask(message: &str, stage: &str) -> Value {
    serde_json::json!({
        "message": message,
        "stage": stage,
        "action": "ask_question",
    })
}

/// Create and start a session whose greeting asks `first_question`.
pub async fn started_session(
    agent: &InterviewAgent,
    mock: &MockLlmProvider,
    first_question: &str,
) -> String {
    let session = agent
        .create_session("Ada Lovelace", "ada@example.com", None)
        .await
        .unwrap();
    mock.push_text(&ask(first_question, "personal").to_string());
    agent.start(&session.token, true, true).await.unwrap();
    session.token
}
