//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;

use interview_agent_llm::ProviderConfig;
use serde::{Deserialize, Serialize};

/// Tunables of the interview agent itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Number of most recent turns sent to the model
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Cheating events needed to terminate an interview
    #[serde(default = "default_cheating_threshold")]
    pub cheating_threshold: u32,
    /// Output token cap for a conversational turn
    #[serde(default = "default_turn_max_tokens")]
    pub turn_max_tokens: u32,
    /// Output token cap for the final evaluation report
    #[serde(default = "default_evaluation_max_tokens")]
    pub evaluation_max_tokens: u32,
    /// Output token cap for resume structuring
    #[serde(default = "default_resume_max_tokens")]
    pub resume_max_tokens: u32,
}

fn default_history_window() -> usize {
    10
}

fn default_cheating_threshold() -> u32 {
    5
}

fn default_turn_max_tokens() -> u32 {
    1000
}

fn default_evaluation_max_tokens() -> u32 {
    2000
}

fn default_resume_max_tokens() -> u32 {
    2000
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            cheating_threshold: default_cheating_threshold(),
            turn_max_tokens: default_turn_max_tokens(),
            evaluation_max_tokens: default_evaluation_max_tokens(),
            resume_max_tokens: default_resume_max_tokens(),
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend used for interviews, evaluations and resume structuring
    #[serde(default)]
    pub llm: ProviderConfig,
    /// Agent tunables
    #[serde(default)]
    pub agent: AgentSettings,
    /// Database file override (defaults to ~/.interview-agent/interviews.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm.model.trim().is_empty() {
            return Err("llm.model must not be empty".to_string());
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(format!(
                "Invalid temperature: {}. Must be between 0.0 and 2.0",
                self.llm.temperature
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err("llm.timeout_secs must be at least 1 second".to_string());
        }

        if self.agent.history_window == 0 {
            return Err("agent.history_window must be at least 1".to_string());
        }

        if self.agent.cheating_threshold == 0 {
            return Err("agent.cheating_threshold must be at least 1".to_string());
        }

        if self.agent.turn_max_tokens == 0 || self.agent.evaluation_max_tokens == 0 {
            return Err("agent token limits must be positive".to_string());
        }

        Ok(())
    }

    /// Provider configuration with the API key filled from the environment
    /// when the file does not carry one.
    pub fn resolved_llm_config(&self) -> ProviderConfig {
        self.resolved_llm_config_with(|name| std::env::var(name).ok())
    }

    fn resolved_llm_config_with(&self, lookup: impl Fn(&str) -> Option<String>) -> ProviderConfig {
        let mut config = self.llm.clone();
        let has_key = config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            if let Some(var) = config.provider.api_key_env() {
                config.api_key = lookup(var).filter(|k| !k.trim().is_empty());
            }
        }
        config
    }
}
