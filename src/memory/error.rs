//! Storage error types.
//!
//! Both the conversation store and the knowledge store report failures
//! through [`PersistenceError`]. Callers on the request path log and swallow
//! these; only startup (opening a database) treats them as fatal.

use std::fmt;

/// Errors that can occur in store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceError {
    kind: Box<PersistenceErrorKind>,
}

/// Specific storage error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceErrorKind {
    /// Failed to open or create the database
    DatabaseOpen {
        /// Path to the database file
        path: String,
        /// Error message from the database
        message: String,
    },
    /// Failed to create tables
    SchemaInit {
        /// Error message from the database
        message: String,
    },
    /// A statement failed
    QueryFailed {
        /// The operation that failed
        operation: String,
        /// Error message from the database
        message: String,
    },
    /// A transcript could not be encoded
    SerializationFailed {
        /// Error message
        message: String,
    },
    /// A stored transcript could not be decoded
    DeserializationFailed {
        /// Error message
        message: String,
    },
    /// No connection could be obtained
    ConnectionError {
        /// Error message
        message: String,
    },
}

impl PersistenceError {
    /// Creates a new persistence error with the given kind.
    #[must_use]
    pub fn new(kind: PersistenceErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &PersistenceErrorKind {
        &self.kind
    }

    /// Creates a database open error.
    #[must_use]
    pub fn database_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(PersistenceErrorKind::DatabaseOpen {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Creates a schema initialization error.
    #[must_use]
    pub fn schema_init(message: impl Into<String>) -> Self {
        Self::new(PersistenceErrorKind::SchemaInit {
            message: message.into(),
        })
    }

    /// Creates a query failed error.
    #[must_use]
    pub fn query_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(PersistenceErrorKind::QueryFailed {
            operation: operation.into(),
            message: message.into(),
        })
    }

    /// Creates a serialization failed error.
    #[must_use]
    pub fn serialization_failed(message: impl Into<String>) -> Self {
        Self::new(PersistenceErrorKind::SerializationFailed {
            message: message.into(),
        })
    }

    /// Creates a deserialization failed error.
    #[must_use]
    pub fn deserialization_failed(message: impl Into<String>) -> Self {
        Self::new(PersistenceErrorKind::DeserializationFailed {
            message: message.into(),
        })
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::new(PersistenceErrorKind::ConnectionError {
            message: message.into(),
        })
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            PersistenceErrorKind::DatabaseOpen { path, message } => write!(
                f,
                "cannot open store at '{path}': {message}; check [storage].database"
            ),
            PersistenceErrorKind::SchemaInit { message } => {
                write!(f, "cannot create conversation/knowledge tables: {message}")
            }
            PersistenceErrorKind::QueryFailed { operation, message } => {
                write!(f, "{operation} failed: {message}")
            }
            PersistenceErrorKind::SerializationFailed { message } => {
                write!(f, "cannot encode transcript: {message}")
            }
            PersistenceErrorKind::DeserializationFailed { message } => {
                write!(f, "stored record is unreadable: {message}")
            }
            PersistenceErrorKind::ConnectionError { message } => {
                write!(f, "store connection lost: {message}")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}
