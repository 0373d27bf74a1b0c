//! Ollama Provider
//!
//! Implementation of the LlmProvider trait for Ollama local inference
//! using the ollama-rs native SDK. No API key is required.

use async_trait::async_trait;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::chat::{ChatMessage, ChatMessageResponse, MessageRole as OllamaRole};
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;

use crate::http_client::build_http_client;
use crate::provider::LlmProvider;
use crate::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageRole, ProviderConfig,
    StopReason, UsageStats,
};

/// Default Ollama API endpoint
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Ollama provider for local inference using the native ollama-rs SDK
pub struct OllamaProvider {
    config: ProviderConfig,
    client: Ollama,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(OLLAMA_DEFAULT_URL);

        let http_client = build_http_client(config.timeout_secs)?;
        let client = Self::create_client(base_url, http_client);

        Ok(Self { config, client })
    }

    /// Create an Ollama SDK client from a base URL string.
    ///
    /// Parses the URL to extract host and port for the SDK, falling back to
    /// the default local endpoint if parsing fails. The supplied reqwest
    /// client carries the request deadline.
    fn create_client(base_url: &str, http_client: reqwest::Client) -> Ollama {
        let (host_url, port) = match url::Url::parse(base_url) {
            Ok(parsed) => {
                let scheme = parsed.scheme();
                let host = parsed.host_str().unwrap_or("localhost");
                let port = parsed.port().unwrap_or(11434);
                // Ollama takes the host and port separately
                (format!("{}://{}", scheme, host), port)
            }
            Err(_) => ("http://localhost".to_string(), 11434),
        };
        Ollama::new_with_client(host_url, port, http_client)
    }

    /// Get the base URL for the Ollama server (used in error messages)
    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(OLLAMA_DEFAULT_URL)
    }

    /// Build a ChatMessageRequest from our unified types
    fn build_chat_request(
        &self,
        messages: &[Message],
        system: Option<&str>,
        request_options: &LlmRequestOptions,
    ) -> ChatMessageRequest {
        let mut chat_messages: Vec<ChatMessage> = Vec::with_capacity(messages.len() + 1);

        if let Some(sys) = system {
            chat_messages.push(ChatMessage::system(sys.to_string()));
        }

        chat_messages.extend(messages.iter().map(|m| {
            let role = match m.role {
                MessageRole::User => OllamaRole::User,
                MessageRole::Assistant => OllamaRole::Assistant,
            };
            ChatMessage::new(role, m.content.clone())
        }));

        let temperature = self.config.effective_temperature(request_options);
        let max_tokens = self.config.effective_max_tokens(request_options);
        let mut opts = ModelOptions::default().temperature(temperature);
        if max_tokens > 0 {
            opts = opts.num_predict(max_tokens as i32);
        }

        ChatMessageRequest::new(self.config.model.clone(), chat_messages).options(opts)
    }

    /// Convert an ollama-rs ChatMessageResponse to our unified LlmResponse.
    fn convert_response(&self, response: &ChatMessageResponse) -> LlmResponse {
        let content = response.message.content.trim();

        let usage = response
            .final_data
            .as_ref()
            .map(|final_data| UsageStats {
                input_tokens: final_data.prompt_eval_count as u32,
                output_tokens: final_data.eval_count as u32,
            })
            .unwrap_or_default();

        LlmResponse {
            content: if content.is_empty() {
                None
            } else {
                Some(content.to_string())
            },
            stop_reason: StopReason::EndTurn,
            usage,
            model: response.model.clone(),
        }
    }

    /// Classify an SDK error message.
    fn map_sdk_error(&self, msg: String) -> LlmError {
        let lower = msg.to_lowercase();
        if lower.contains("timed out") || lower.contains("timeout") {
            LlmError::Timeout {
                seconds: self.config.timeout_secs,
            }
        } else if lower.contains("connect") || lower.contains("connection refused") {
            LlmError::ProviderUnavailable {
                message: format!("Cannot connect to Ollama at {}: {}", self.base_url(), msg),
            }
        } else if lower.contains("not found") || lower.contains("404") {
            LlmError::ModelNotFound {
                model: self.config.model.clone(),
            }
        } else {
            LlmError::NetworkError { message: msg }
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let request = self.build_chat_request(&messages, system.as_deref(), &request_options);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| self.map_sdk_error(e.to_string()))?;

        Ok(self.convert_response(&response))
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}
