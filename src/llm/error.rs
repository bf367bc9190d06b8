//! Chat provider error types.
//!
//! The agent never propagates these: a failed completion is rendered into
//! the synthetic `Error: Failed to get response from LLM: ...` answer, so the
//! `Display` text is what the caller eventually reads.

use std::fmt;
use std::time::Duration;

/// Errors that can occur while requesting a chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LLMError {
    /// The specific error that occurred
    pub kind: LLMErrorKind,
}

/// Specific provider error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LLMErrorKind {
    /// The provider endpoint could not be reached
    Network {
        /// Transport-level description
        message: String,
    },
    /// The provider throttled this key (HTTP 429)
    RateLimited {
        /// Wait the provider asked for
        retry_after: Duration,
    },
    /// The provider answered with a non-success status
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
        /// Error type from the API (if available)
        error_type: Option<String>,
    },
    /// Authentication failed
    AuthenticationFailed {
        /// Reason for authentication failure
        reason: String,
    },
    /// Invalid request parameters
    InvalidRequest {
        /// Description of what was invalid
        reason: String,
    },
    /// The response body was not a chat completion
    ParseError {
        /// Description of the parse error
        message: String,
    },
    /// Configuration error
    InvalidConfig {
        /// The configuration field that was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
    /// No completion arrived within `[provider].timeout_secs`
    Timeout {
        /// The timeout duration that was exceeded
        duration: Duration,
    },
    /// The completion carried no choices
    EmptyResponse,
}

impl LLMError {
    /// Creates a new LLMError with the given kind.
    #[must_use]
    pub fn new(kind: LLMErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::Network {
            message: message.into(),
        })
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::new(LLMErrorKind::RateLimited { retry_after })
    }

    /// Creates an API error.
    #[must_use]
    pub fn api_error(
        status_code: u16,
        message: impl Into<String>,
        error_type: Option<String>,
    ) -> Self {
        Self::new(LLMErrorKind::ApiError {
            status_code,
            message: message.into(),
            error_type,
        })
    }

    /// Creates an authentication failed error.
    #[must_use]
    pub fn authentication_failed(reason: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::AuthenticationFailed {
            reason: reason.into(),
        })
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::InvalidRequest {
            reason: reason.into(),
        })
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::ParseError {
            message: message.into(),
        })
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(duration: Duration) -> Self {
        Self::new(LLMErrorKind::Timeout { duration })
    }

    /// Creates an empty response error.
    #[must_use]
    pub fn empty_response() -> Self {
        Self::new(LLMErrorKind::EmptyResponse)
    }
}

impl fmt::Display for LLMError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LLMErrorKind::Network { message } => {
                write!(f, "provider unreachable: {message}")
            }
            LLMErrorKind::RateLimited { retry_after } => {
                write!(
                    f,
                    "provider rate limit reached; wait {}s before asking again",
                    retry_after.as_secs()
                )
            }
            LLMErrorKind::ApiError {
                status_code,
                message,
                error_type: Some(error_type),
            } => write!(f, "provider rejected the completion (HTTP {status_code}, {error_type}): {message}"),
            LLMErrorKind::ApiError {
                status_code,
                message,
                error_type: None,
            } => write!(f, "provider rejected the completion (HTTP {status_code}): {message}"),
            LLMErrorKind::AuthenticationFailed { reason } => {
                write!(f, "provider refused the API key: {reason}; check [provider].api_key_env")
            }
            LLMErrorKind::InvalidRequest { reason } => {
                write!(f, "provider rejected the request: {reason}; check [provider].model")
            }
            LLMErrorKind::ParseError { message } => {
                write!(f, "reply was not a chat completion: {message}")
            }
            LLMErrorKind::InvalidConfig { field, reason } => {
                write!(f, "[provider].{field} is invalid: {reason}")
            }
            LLMErrorKind::Timeout { duration } => {
                write!(
                    f,
                    "no completion within {}s; raise [provider].timeout_secs",
                    duration.as_secs()
                )
            }
            LLMErrorKind::EmptyResponse => write!(f, "completion carried no choices"),
        }
    }
}

impl std::error::Error for LLMError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_names_the_wait() {
        let error = LLMError::rate_limited(Duration::from_secs(30));
        assert_eq!(
            error.to_string(),
            "provider rate limit reached; wait 30s before asking again"
        );
    }

    #[test]
    fn rejected_completion_includes_type_when_known() {
        let typed = LLMError::api_error(404, "model not found", Some("invalid_request_error".to_string()));
        assert_eq!(
            typed.to_string(),
            "provider rejected the completion (HTTP 404, invalid_request_error): model not found"
        );
        let untyped = LLMError::api_error(503, "unavailable", None);
        assert_eq!(
            untyped.to_string(),
            "provider rejected the completion (HTTP 503): unavailable"
        );
    }

    #[test]
    fn auth_and_config_errors_point_at_provider_settings() {
        assert!(LLMError::authentication_failed("missing GROQ_API_KEY")
            .to_string()
            .contains("[provider].api_key_env"));
        assert_eq!(
            LLMError::invalid_config("base_url", "required for custom providers").to_string(),
            "[provider].base_url is invalid: required for custom providers"
        );
    }

    #[test]
    fn timeout_suggests_the_setting() {
        let error = LLMError::timeout(Duration::from_secs(60));
        assert_eq!(
            error.to_string(),
            "no completion within 60s; raise [provider].timeout_secs"
        );
    }

    #[test]
    fn empty_response_display() {
        assert_eq!(
            LLMError::empty_response().to_string(),
            "completion carried no choices"
        );
    }
}
