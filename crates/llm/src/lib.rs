//! Interview Agent LLM
//!
//! Provides a unified interface for interacting with multiple LLM providers:
//! - Anthropic Claude
//! - OpenAI-compatible APIs (OpenAI, Groq)
//! - Ollama (local inference)
//!
//! Also includes the HTTP client factory and the provider factory that picks
//! an implementation from configuration.

pub mod anthropic;
pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use factory::create_provider;
pub use http_client::build_http_client;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
