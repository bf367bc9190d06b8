//! Top-level error type for wiring the workflow together.
//!
//! Component errors ([`ToolError`](crate::tools::ToolError),
//! [`LLMError`](crate::llm::LLMError),
//! [`PersistenceError`](crate::memory::PersistenceError)) stay local to
//! their boundary. `WorkflowError` covers what can go wrong while assembling
//! and launching the service (reading configuration, building the provider,
//! opening stores, binding the listener) plus requests a one-shot CLI
//! command rejects.
//!
//! No external error crates (anyhow, thiserror, eyre) are used.

use crate::llm::LLMError;
use crate::memory::PersistenceError;
use crate::service::ApiError;
use std::fmt;

/// Errors raised while configuring or launching the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowError {
    /// The specific error that occurred
    pub kind: WorkflowErrorKind,
}

/// Specific workflow error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowErrorKind {
    /// A configuration value is missing or unusable
    Configuration {
        /// The offending field or file
        field: String,
        /// Why it was rejected
        reason: String,
    },
    /// The chat provider could not be constructed
    Provider {
        /// Error from the provider layer
        reason: String,
    },
    /// A store could not be opened
    Persistence {
        /// Error from the storage layer
        reason: String,
    },
    /// The HTTP server failed to bind or serve
    Server {
        /// Description of the failure
        reason: String,
    },
    /// The tracing subscriber could not be installed
    Logging {
        /// Description of the failure
        reason: String,
    },
    /// A request was rejected before it ran (empty query, unknown tool)
    Request {
        /// The rejection detail
        detail: String,
    },
}

impl WorkflowError {
    /// Creates a new WorkflowError with the given kind.
    #[must_use]
    pub fn new(kind: WorkflowErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Configuration {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Creates a provider error.
    #[must_use]
    pub fn provider(reason: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Provider {
            reason: reason.into(),
        })
    }

    /// Creates a persistence error.
    #[must_use]
    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Persistence {
            reason: reason.into(),
        })
    }

    /// Creates a server error.
    #[must_use]
    pub fn server(reason: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Server {
            reason: reason.into(),
        })
    }

    /// Creates a logging error.
    #[must_use]
    pub fn logging(reason: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Logging {
            reason: reason.into(),
        })
    }

    /// Creates a rejected-request error.
    #[must_use]
    pub fn request(detail: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Request {
            detail: detail.into(),
        })
    }

    /// Returns true if this error indicates a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, WorkflowErrorKind::Configuration { .. })
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WorkflowErrorKind::Configuration { field, reason } => {
                write!(f, "configuration error for '{}': {}", field, reason)
            }
            WorkflowErrorKind::Provider { reason } => {
                write!(
                    f,
                    "failed to set up LLM provider: {}; check the [provider] section",
                    reason
                )
            }
            WorkflowErrorKind::Persistence { reason } => {
                write!(
                    f,
                    "failed to open storage: {}; check the [storage] section",
                    reason
                )
            }
            WorkflowErrorKind::Server { reason } => {
                write!(f, "server error: {}", reason)
            }
            WorkflowErrorKind::Logging { reason } => {
                write!(f, "failed to initialize logging: {}", reason)
            }
            WorkflowErrorKind::Request { detail } => write!(f, "request rejected: {detail}"),
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<LLMError> for WorkflowError {
    fn from(error: LLMError) -> Self {
        Self::provider(error.to_string())
    }
}

impl From<PersistenceError> for WorkflowError {
    fn from(error: PersistenceError) -> Self {
        Self::persistence(error.to_string())
    }
}

impl From<ApiError> for WorkflowError {
    fn from(error: ApiError) -> Self {
        Self::request(error.detail())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_display_names_field() {
        let error = WorkflowError::configuration("provider.model", "must not be empty");
        let message = error.to_string();
        assert!(message.contains("provider.model"));
        assert!(message.contains("must not be empty"));
        assert!(error.is_configuration());
    }

    #[test]
    fn provider_display_points_at_section() {
        let error = WorkflowError::provider("missing API key");
        assert!(error.to_string().contains("[provider]"));
        assert!(!error.is_configuration());
    }

    #[test]
    fn persistence_error_converts() {
        let error: WorkflowError = PersistenceError::database_open("x.db", "denied").into();
        assert!(matches!(error.kind, WorkflowErrorKind::Persistence { .. }));
        assert!(error.to_string().contains("x.db"));
    }

    #[test]
    fn rejected_request_is_not_a_configuration_error() {
        let error: WorkflowError = ApiError::bad_request("Query must not be empty.").into();
        assert!(!error.is_configuration());
        assert_eq!(
            error.kind,
            WorkflowErrorKind::Request {
                detail: "Query must not be empty.".to_string()
            }
        );
        assert_eq!(error.to_string(), "request rejected: Query must not be empty.");
    }

    #[test]
    fn server_display() {
        let error = WorkflowError::server("address in use");
        assert_eq!(error.to_string(), "server error: address in use");
    }

    #[test]
    fn errors_are_clone_and_eq() {
        let error = WorkflowError::logging("already set");
        assert_eq!(error.clone(), error);
    }
}
