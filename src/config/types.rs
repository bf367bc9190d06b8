//! Configuration file types.
//!
//! Every section has a usable default, so an empty file (or no file at all)
//! yields a working configuration for a Groq-backed local server.

use crate::agent::{DEFAULT_TEMPERATURE, DEFAULT_USERNAME};
use crate::error::WorkflowError;
use crate::llm::{ProviderConfig, ProviderKind, DEFAULT_MODEL};
use crate::logging::LoggingConfig;
use crate::memory::PersistenceConfig;
use crate::tools::NamespacePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
///
/// This structure maps directly to the TOML configuration file format:
///
/// ```toml
/// default_username = "anonymous"
///
/// [provider]
/// type = "groq"
/// model = "llama-3.3-70b-versatile"
/// api_key_env = "GROQ_API_KEY"
///
/// [storage]
/// database = "agentic-workflow.db"
/// tool_snapshot = "tools.json"
///
/// [sandbox]
/// max_operations = 1000000
/// allow_filesystem = false
///
/// [server]
/// bind = "127.0.0.1:8000"
/// cors_origins = ["*"]
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// The chat provider
    pub provider: ProviderSettings,
    /// Conversation, knowledge and tool snapshot storage
    pub storage: StorageSettings,
    /// Limits for synthesized tools
    pub sandbox: NamespacePolicy,
    /// HTTP listener
    pub server: ServerSettings,
    /// Console and file logging
    pub logging: LoggingConfig,
    /// Username recorded when a request does not carry one
    pub default_username: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            storage: StorageSettings::default(),
            sandbox: NamespacePolicy::default(),
            server: ServerSettings::default(),
            logging: LoggingConfig::default(),
            default_username: DEFAULT_USERNAME.to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Creates a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the provider section.
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderSettings) -> Self {
        self.provider = provider;
        self
    }

    /// Replaces the storage section.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageSettings) -> Self {
        self.storage = storage;
        self
    }

    /// Replaces the sandbox section.
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: NamespacePolicy) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Replaces the server section.
    #[must_use]
    pub fn with_server(mut self, server: ServerSettings) -> Self {
        self.server = server;
        self
    }

    /// Replaces the logging section.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// The `[provider]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Backend flavor: "groq", "openai", "ollama" or "custom".
    #[serde(rename = "type")]
    pub kind: ProviderKind,

    /// Model identifier sent with every request.
    pub model: String,

    /// Custom base URL. Required for `custom`, optional otherwise.
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,

    /// Direct API key value (discouraged - use api_key_env instead).
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,

    /// Temperature used when a request does not supply one.
    pub temperature: f32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Groq,
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            api_key_env: None,
            api_key: None,
            timeout_secs: 60,
            max_tokens: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ProviderSettings {
    /// Creates settings for `kind` with its default model.
    #[must_use]
    pub fn new(kind: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            kind,
            model: model.into(),
            ..Self::default()
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the API key environment variable.
    #[must_use]
    pub fn with_api_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = Some(env_var.into());
        self
    }

    /// Sets a direct API key (discouraged).
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the token limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the default temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Resolves the API key from the process environment.
    ///
    /// Order: the variable named by `api_key_env`, the backend's standard
    /// variable, then the inline `api_key`.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        self.api_key_env
            .as_deref()
            .and_then(|name| non_empty(lookup(name)))
            .or_else(|| {
                self.kind
                    .default_api_key_env()
                    .and_then(|name| non_empty(lookup(name)))
            })
            .or_else(|| non_empty(self.api_key.clone()))
    }

    /// Converts to a runtime [`ProviderConfig`], reading the API key from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the backend needs a key and none
    /// resolves, or if a `custom` backend has no `base_url`.
    pub fn to_provider_config(&self) -> Result<ProviderConfig, WorkflowError> {
        self.build_provider_config(self.resolve_api_key())
    }

    fn build_provider_config(
        &self,
        api_key: Option<String>,
    ) -> Result<ProviderConfig, WorkflowError> {
        if self.model.trim().is_empty() {
            return Err(WorkflowError::configuration(
                "provider.model",
                "must not be empty",
            ));
        }

        let api_key = match api_key {
            Some(key) => key,
            None if self.kind.requires_api_key() => {
                let hint = self
                    .api_key_env
                    .as_deref()
                    .or(self.kind.default_api_key_env())
                    .unwrap_or("api_key");
                return Err(WorkflowError::configuration(
                    "provider.api_key",
                    format!("no API key for '{}'; set {hint}", self.kind),
                ));
            }
            None => String::new(),
        };

        let base_url = match (&self.base_url, self.kind.default_base_url()) {
            (Some(url), _) => url.clone(),
            (None, Some(url)) => url.to_string(),
            (None, None) => {
                return Err(WorkflowError::configuration(
                    "provider.base_url",
                    format!("required for provider type '{}'", self.kind),
                ));
            }
        };

        let mut config = ProviderConfig::openai_compatible(base_url, self.model.clone())
            .with_api_key(api_key)
            .with_timeout(Duration::from_secs(self.timeout_secs.max(1)));
        config.kind = self.kind;
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        Ok(config)
    }
}

/// The `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// libSQL database file, or ":memory:" for an ephemeral store.
    pub database: String,
    /// Where the tool registry is saved. Unset keeps tools in memory only.
    pub tool_snapshot: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database: PersistenceConfig::default().db_path,
            tool_snapshot: None,
        }
    }
}

impl StorageSettings {
    /// Sets the database path.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the tool snapshot path.
    #[must_use]
    pub fn with_tool_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_snapshot = Some(path.into());
        self
    }

    /// Returns the persistence layer configuration.
    #[must_use]
    pub fn persistence(&self) -> PersistenceConfig {
        PersistenceConfig::new(self.database.clone())
    }
}

/// The `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub bind: String,
    /// Allowed CORS origins; `"*"` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerSettings {
    /// Sets the listen address.
    #[must_use]
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Sets the allowed origins.
    #[must_use]
    pub fn with_cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if any origin is allowed.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.provider.kind, ProviderKind::Groq);
        assert_eq!(config.provider.model, DEFAULT_MODEL);
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert!(config.server.allows_any_origin());
        assert_eq!(config.default_username, "anonymous");
        assert!(config.storage.tool_snapshot.is_none());
    }

    #[test]
    fn api_key_env_wins_over_standard_variable() {
        let settings = ProviderSettings::default()
            .with_api_key_env("MY_KEY")
            .with_api_key("inline");
        let lookup = env(&[("MY_KEY", "custom"), ("GROQ_API_KEY", "standard")]);
        assert_eq!(
            settings.resolve_api_key_with(lookup),
            Some("custom".to_string())
        );
    }

    #[test]
    fn standard_variable_before_inline_key() {
        let settings = ProviderSettings::default().with_api_key("inline");
        let lookup = env(&[("GROQ_API_KEY", "standard")]);
        assert_eq!(
            settings.resolve_api_key_with(lookup),
            Some("standard".to_string())
        );

        let settings = ProviderSettings::default().with_api_key("inline");
        assert_eq!(
            settings.resolve_api_key_with(env(&[("GROQ_API_KEY", "  ")])),
            Some("inline".to_string())
        );
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let error = ProviderSettings::default()
            .build_provider_config(None)
            .unwrap_err();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = ProviderSettings::new(ProviderKind::Ollama, "llama3.2")
            .build_provider_config(None)
            .unwrap();
        assert!(config.api_key.is_empty());
        assert_eq!(config.kind, ProviderKind::Ollama);
        assert_eq!(
            config.chat_completions_endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn custom_requires_base_url() {
        let settings = ProviderSettings::new(ProviderKind::Custom, "m");
        assert!(settings.build_provider_config(None).is_err());

        let config = settings
            .with_base_url("http://127.0.0.1:9000/v1")
            .with_max_tokens(256)
            .with_timeout_secs(5)
            .build_provider_config(None)
            .unwrap();
        assert_eq!(config.kind, ProviderKind::Custom);
        assert_eq!(config.max_tokens, Some(256));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn empty_model_rejected() {
        let error = ProviderSettings::new(ProviderKind::Ollama, " ")
            .build_provider_config(None)
            .unwrap_err();
        assert!(error.to_string().contains("provider.model"));
    }

    #[test]
    fn storage_builds_persistence_config() {
        let storage = StorageSettings::default()
            .with_database(":memory:")
            .with_tool_snapshot("tools.json");
        assert!(storage.persistence().is_in_memory());
        assert_eq!(storage.tool_snapshot, Some(PathBuf::from("tools.json")));
    }

    #[test]
    fn explicit_origins_do_not_allow_any() {
        let server = ServerSettings::default().with_cors_origins(["http://localhost:3000"]);
        assert!(!server.allows_any_origin());
    }
}
