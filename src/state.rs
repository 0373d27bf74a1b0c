//! Application State
//!
//! Wires configuration, the database and the LLM backend into one
//! `InterviewAgent` for the command handlers.

use std::sync::Arc;

use interview_agent_llm::{create_provider, LlmProvider};

use crate::models::settings::AppConfig;
use crate::services::interview::InterviewAgent;
use crate::storage::{ConfigService, Database, SessionStore};
use crate::utils::error::AppResult;

/// Everything a command needs, resolved once at startup
pub struct AppState {
    config: AppConfig,
    database: Database,
    agent: InterviewAgent,
}

impl AppState {
    /// Load config.json, open the database and build the configured backend.
    pub fn initialize() -> AppResult<Self> {
        let config = ConfigService::new()?.get_config_clone();
        let database = match &config.database_path {
            Some(path) => Database::open(path)?,
            None => Database::new()?,
        };
        let backend = create_provider(&config.resolved_llm_config())?;
        Self::from_parts(config, database, backend)
    }

    /// Assemble state from already constructed parts.
    pub fn from_parts(
        config: AppConfig,
        database: Database,
        backend: Arc<dyn LlmProvider>,
    ) -> AppResult<Self> {
        let store = SessionStore::new(database.clone())?;
        let agent = InterviewAgent::new(store, backend, config.agent.clone());
        tracing::debug!(
            provider = %config.llm.provider,
            model = %config.llm.model,
            "application state initialized"
        );
        Ok(Self {
            config,
            database,
            agent,
        })
    }

    pub fn agent(&self) -> &InterviewAgent {
        &self.agent
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        self.database.is_healthy()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("provider", &self.config.llm.provider)
            .field("model", &self.config.llm.model)
            .finish()
    }
}
