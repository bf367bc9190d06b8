//! Chat provider configuration.
//!
//! All supported backends speak the OpenAI chat-completions dialect; they
//! differ only in base URL, default model and whether a key is required.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default model served by Groq.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Which chat-completion backend to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Groq's OpenAI-compatible endpoint
    #[default]
    Groq,
    /// OpenAI
    #[serde(rename = "openai")]
    OpenAI,
    /// A local Ollama server
    Ollama,
    /// Any other OpenAI-compatible endpoint; `base_url` must be set
    Custom,
}

impl ProviderKind {
    /// Base URL used when the configuration does not name one.
    #[must_use]
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::Custom => None,
        }
    }

    /// Conventional environment variable holding the API key.
    #[must_use]
    pub fn default_api_key_env(self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Ollama | Self::Custom => None,
        }
    }

    /// Returns true if requests are rejected without a key.
    #[must_use]
    pub fn requires_api_key(self) -> bool {
        matches!(self, Self::Groq | Self::OpenAI)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Groq => write!(f, "groq"),
            Self::OpenAI => write!(f, "openai"),
            Self::Ollama => write!(f, "ollama"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Resolved settings for one chat provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// The backend flavor
    pub kind: ProviderKind,
    /// The API key (empty for local providers)
    pub api_key: String,
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Model used when a request does not name one
    pub model: String,
    /// Upper bound on generated tokens, if any
    pub max_tokens: Option<u32>,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Creates a configuration for Groq.
    ///
    /// # Examples
    ///
    /// ```
    /// use agentic_workflow::llm::ProviderConfig;
    ///
    /// let config = ProviderConfig::groq("gsk_test");
    /// assert_eq!(config.model, "llama-3.3-70b-versatile");
    /// ```
    #[must_use]
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::for_kind(ProviderKind::Groq, api_key, DEFAULT_MODEL)
    }

    /// Creates a configuration for OpenAI.
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::for_kind(ProviderKind::OpenAI, api_key, "gpt-4o-mini")
    }

    /// Creates a configuration for a local Ollama server.
    #[must_use]
    pub fn ollama(model: impl Into<String>) -> Self {
        Self::for_kind(ProviderKind::Ollama, String::new(), model)
            .with_timeout(Duration::from_secs(300))
    }

    /// Creates a configuration for an arbitrary OpenAI-compatible endpoint.
    #[must_use]
    pub fn openai_compatible(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::for_kind(ProviderKind::Custom, String::new(), model).with_base_url(base_url)
    }

    fn for_kind(kind: ProviderKind, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            base_url: kind.default_base_url().unwrap_or_default().to_string(),
            model: model.into(),
            max_tokens: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the token limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the full chat-completions URL.
    #[must_use]
    pub fn chat_completions_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groq_defaults() {
        let config = ProviderConfig::groq("key");
        assert_eq!(config.kind, ProviderKind::Groq);
        assert_eq!(
            config.chat_completions_endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(config.max_tokens, None);
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = ProviderConfig::ollama("llama3.2");
        assert!(config.api_key.is_empty());
        assert!(!config.kind.requires_api_key());
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let config = ProviderConfig::openai_compatible("http://localhost:8080/v1/", "m");
        assert_eq!(
            config.chat_completions_endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(config.kind.default_base_url(), None);
    }

    #[test]
    fn kind_parses_from_lowercase() {
        let kind: ProviderKind = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(kind, ProviderKind::OpenAI);
        assert_eq!(kind.to_string(), "openai");
        assert_eq!(kind.default_api_key_env(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn builders_override_fields() {
        let config = ProviderConfig::groq("a")
            .with_model("mixtral")
            .with_max_tokens(512)
            .with_api_key("b");
        assert_eq!(config.model, "mixtral");
        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(config.api_key, "b");
    }
}
