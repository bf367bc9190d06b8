//! Agent configuration.

use crate::llm::DEFAULT_MODEL;
use serde::{Deserialize, Serialize};

/// Temperature used when a request does not choose one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Username recorded for callers that do not identify themselves.
pub const DEFAULT_USERNAME: &str = "anonymous";

/// Configuration for one agent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// The system prompt seeded as the first transcript turn
    pub system_prompt: String,
    /// Model identifier passed to the provider
    pub model: String,
    /// Sampling temperature passed to the provider
    pub temperature: f32,
    /// Owner of the conversation record
    pub username: String,
}

impl AgentConfig {
    /// Creates a configuration with the given system prompt.
    ///
    /// # Examples
    ///
    /// ```
    /// use agentic_workflow::agent::AgentConfig;
    ///
    /// let config = AgentConfig::new("You are a helpful assistant.")
    ///     .with_temperature(0.2)
    ///     .with_username("ada");
    /// assert_eq!(config.username, "ada");
    /// ```
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            ..Self::default()
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the conversation owner.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            username: DEFAULT_USERNAME.to_string(),
        }
    }
}
