//! Compilation error types.
//!
//! Raised while turning caller-supplied fragments into a working tool.
//! Syntax problems and init-time failures are kept apart because the
//! registry reports them differently.

use std::fmt;

/// Errors that can occur while synthesizing a tool from source.
///
/// This type uses `Box<CompilationErrorKind>` to keep the error size small,
/// enabling efficient use in Result types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    kind: Box<CompilationErrorKind>,
}

/// Specific compilation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationErrorKind {
    /// A required fragment contained no code.
    EmptySource {
        /// Which fragment was empty (`init` or `call`)
        fragment: &'static str,
    },

    /// A fragment failed to parse.
    Syntax {
        /// Which fragment failed (`init` or `call`)
        fragment: &'static str,
        /// The parser's message, including position
        message: String,
    },

    /// The init fragment parsed but raised when run.
    Initialization {
        /// The runtime error message
        message: String,
    },
}

impl CompilationError {
    /// Creates a new `CompilationError` with the given kind.
    #[must_use]
    pub fn new(kind: CompilationErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &CompilationErrorKind {
        &self.kind
    }

    /// Creates an empty source error.
    #[must_use]
    pub fn empty_source(fragment: &'static str) -> Self {
        Self::new(CompilationErrorKind::EmptySource { fragment })
    }

    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(fragment: &'static str, message: impl Into<String>) -> Self {
        Self::new(CompilationErrorKind::Syntax {
            fragment,
            message: message.into(),
        })
    }

    /// Creates an initialization error.
    #[must_use]
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::new(CompilationErrorKind::Initialization {
            message: message.into(),
        })
    }

    /// Returns true if the source itself is malformed.
    #[must_use]
    pub fn is_code_error(&self) -> bool {
        matches!(
            *self.kind,
            CompilationErrorKind::EmptySource { .. } | CompilationErrorKind::Syntax { .. }
        )
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            CompilationErrorKind::EmptySource { fragment } => {
                write!(f, "{fragment} code cannot be empty")
            }
            CompilationErrorKind::Syntax { fragment, message } => {
                write!(f, "syntax error in {fragment} code: {message}")
            }
            CompilationErrorKind::Initialization { message } => {
                write!(f, "init code raised an error: {message}")
            }
        }
    }
}

impl std::error::Error for CompilationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_display() {
        let error = CompilationError::empty_source("call");
        assert_eq!(error.to_string(), "call code cannot be empty");
        assert!(error.is_code_error());
    }

    #[test]
    fn syntax_display_names_fragment() {
        let error = CompilationError::syntax("init", "Expecting ';' (line 1, position 7)");
        let msg = error.to_string();
        assert!(msg.starts_with("syntax error in init code"));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn initialization_is_not_a_code_error() {
        let error = CompilationError::initialization("division by zero");
        assert!(!error.is_code_error());
        assert!(matches!(
            error.kind(),
            CompilationErrorKind::Initialization { .. }
        ));
    }
}
