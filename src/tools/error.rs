//! Tool error types.
//!
//! Covers registry management (lookup, synthesis, snapshots) and per-call
//! failures. The agent renders call failures into transcript annotations;
//! synthesis failures are returned to whoever asked for the tool.

use crate::tools::compiler::{CompilationError, CompilationErrorKind};
use std::fmt;
use std::time::Duration;

/// Errors that can occur in tool operations.
///
/// This type uses Box<ToolErrorKind> to keep the error size small,
/// enabling efficient use in Result types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    kind: Box<ToolErrorKind>,
}

/// Specific tool error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// Tool not found in registry
    NotFound {
        /// The name of the tool that was not found
        tool_name: String,
    },
    /// Tool already registered
    AlreadyRegistered {
        /// The name of the existing tool
        tool_name: String,
    },
    /// Submitted source could not be compiled
    Compilation {
        /// The tool being synthesized
        tool_name: String,
        /// What the compiler reported
        message: String,
    },
    /// The init fragment raised while constructing the tool
    Initialization {
        /// The tool being synthesized
        tool_name: String,
        /// What the init fragment raised
        message: String,
    },
    /// Tool execution failed
    ExecutionFailed {
        /// The name of the tool
        tool_name: String,
        /// Reason for failure
        reason: String,
    },
    /// Tool execution timed out
    Timeout {
        /// The name of the tool
        tool_name: String,
        /// The timeout duration that was exceeded
        duration: Duration,
    },
    /// Tool input was unusable
    ValidationFailed {
        /// The name of the tool
        tool_name: String,
        /// What was invalid
        reason: String,
    },
    /// Reading or writing the registry snapshot failed
    Snapshot {
        /// Location of the snapshot
        path: String,
        /// Description of the failure
        message: String,
    },
    /// Internal error
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl ToolError {
    /// Creates a new ToolError with the given kind.
    #[must_use]
    pub fn new(kind: ToolErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &ToolErrorKind {
        &self.kind
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound {
            tool_name: tool_name.into(),
        })
    }

    /// Creates an already registered error.
    #[must_use]
    pub fn already_registered(tool_name: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::AlreadyRegistered {
            tool_name: tool_name.into(),
        })
    }

    /// Creates a compilation error.
    #[must_use]
    pub fn compilation(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Compilation {
            tool_name: tool_name.into(),
            message: message.into(),
        })
    }

    /// Creates an initialization error.
    #[must_use]
    pub fn initialization(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Initialization {
            tool_name: tool_name.into(),
            message: message.into(),
        })
    }

    /// Classifies a compiler failure for the named tool.
    #[must_use]
    pub fn from_compilation(tool_name: impl Into<String>, error: &CompilationError) -> Self {
        match error.kind() {
            CompilationErrorKind::Initialization { message } => {
                Self::initialization(tool_name, message.clone())
            }
            _ => Self::compilation(tool_name, error.to_string()),
        }
    }

    /// Creates an execution failed error.
    #[must_use]
    pub fn execution_failed(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: reason.into(),
        })
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(tool_name: impl Into<String>, duration: Duration) -> Self {
        Self::new(ToolErrorKind::Timeout {
            tool_name: tool_name.into(),
            duration,
        })
    }

    /// Creates a validation failed error.
    #[must_use]
    pub fn validation_failed(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ValidationFailed {
            tool_name: tool_name.into(),
            reason: reason.into(),
        })
    }

    /// Creates a snapshot error.
    #[must_use]
    pub fn snapshot(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Snapshot {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal {
            message: message.into(),
        })
    }

    /// Returns true if this error indicates the tool was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::NotFound { .. })
    }

    /// Returns true if this error indicates the tool is already registered.
    #[must_use]
    pub fn is_already_registered(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::AlreadyRegistered { .. })
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            ToolErrorKind::NotFound { tool_name } => {
                write!(
                    f,
                    "tool '{}' not found; verify the tool is registered",
                    tool_name
                )
            }
            ToolErrorKind::AlreadyRegistered { tool_name } => {
                write!(
                    f,
                    "tool '{}' already exists; delete it first or use a different name",
                    tool_name
                )
            }
            ToolErrorKind::Compilation { tool_name, message } => {
                write!(f, "tool '{}' failed to compile: {}", tool_name, message)
            }
            ToolErrorKind::Initialization { tool_name, message } => {
                write!(
                    f,
                    "tool '{}' failed to initialize: {}; check the init code",
                    tool_name, message
                )
            }
            ToolErrorKind::ExecutionFailed { tool_name, reason } => {
                write!(f, "tool '{}' execution failed: {}", tool_name, reason)
            }
            ToolErrorKind::Timeout {
                tool_name,
                duration,
            } => {
                write!(
                    f,
                    "tool '{}' timed out after {} seconds",
                    tool_name,
                    duration.as_secs()
                )
            }
            ToolErrorKind::ValidationFailed { tool_name, reason } => {
                write!(
                    f,
                    "tool '{}' validation failed: {}; check the input",
                    tool_name, reason
                )
            }
            ToolErrorKind::Snapshot { path, message } => {
                write!(f, "tool snapshot '{}': {}", path, message)
            }
            ToolErrorKind::Internal { message } => {
                write!(f, "internal tool error: {}", message)
            }
        }
    }
}

impl std::error::Error for ToolError {}
