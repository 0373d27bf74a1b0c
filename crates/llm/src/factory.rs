//! Provider Factory
//!
//! Selects the backend implementation once, from configuration.

use std::sync::Arc;

use crate::anthropic::AnthropicProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAIProvider;
use crate::provider::{missing_api_key_error, LlmProvider};
use crate::types::{LlmResult, ProviderConfig, ProviderType};

/// Build the provider described by `config`.
///
/// Fails only when the provider needs an API key and none is configured, or
/// the HTTP client cannot be constructed.
pub fn create_provider(config: &ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    if config.provider.requires_api_key()
        && config.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
    {
        return Err(missing_api_key_error(&config.provider.to_string()));
    }

    tracing::debug!(
        provider = %config.provider,
        model = %config.model,
        timeout_secs = config.timeout_secs,
        "creating LLM provider"
    );

    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(config.clone())?),
        ProviderType::OpenAI | ProviderType::Groq => Arc::new(OpenAIProvider::new(config.clone())?),
        ProviderType::Ollama => Arc::new(OllamaProvider::new(config.clone())?),
    };
    Ok(provider)
}
