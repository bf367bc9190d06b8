//! Conversation and knowledge storage.
//!
//! Both stores are collaborators the agent reaches through traits:
//!
//! - [`ConversationStore`]: write-once records of completed decision steps
//! - [`KnowledgeStore`]: best-effort context lookup for a query
//!
//! Each has an in-memory implementation for tests and ephemeral runs, and
//! [`LibsqlStore`] implements both on top of a libSQL database.
//!
//! ## Example
//!
//! ```rust
//! use agentic_workflow::memory::{ConversationRecord, ConversationStore, InMemoryConversationStore};
//! use agentic_workflow::types::ConversationId;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = InMemoryConversationStore::new();
//! store
//!     .append(ConversationRecord::new("ada", ConversationId::new(), vec![]))
//!     .await
//!     .unwrap();
//! assert_eq!(store.query("ada").await.unwrap().len(), 1);
//! # }
//! ```

mod conversation;
mod error;
mod knowledge;
mod persistence;

pub use conversation::{ConversationRecord, ConversationStore, InMemoryConversationStore};
pub use error::{PersistenceError, PersistenceErrorKind};
pub use knowledge::{InMemoryKnowledgeStore, KnowledgeStore, NoKnowledge};
pub use persistence::{
    initialize_schema, open_database, LibsqlStore, PersistenceConfig, SCHEMA_VERSION,
};
