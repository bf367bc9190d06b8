//! Conversation records and the store they are written to.

use crate::memory::error::PersistenceError;
use crate::messages::Message;
use crate::types::ConversationId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tokio::sync::RwLock;

/// One completed decision step, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Owner of the conversation
    pub username: String,
    /// Identifier drawn by the agent that produced the record
    pub conversation_id: ConversationId,
    /// When the step completed
    pub timestamp: DateTime<Utc>,
    /// The full transcript
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        conversation_id: ConversationId,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            username: username.into(),
            conversation_id,
            timestamp: Utc::now(),
            messages,
        }
    }

    /// Overrides the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Write-once storage for conversation records.
///
/// Callers treat failures as non-fatal: the agent logs them and moves on.
#[async_trait]
pub trait ConversationStore: Send + Sync + Debug {
    /// Stores a record.
    async fn append(&self, record: ConversationRecord) -> Result<(), PersistenceError>;

    /// Returns every record for `username`, oldest first.
    async fn query(&self, username: &str) -> Result<Vec<ConversationRecord>, PersistenceError>;
}

/// A [`ConversationStore`] that keeps records in process memory.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    records: RwLock<Vec<ConversationRecord>>,
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, record: ConversationRecord) -> Result<(), PersistenceError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn query(&self, username: &str) -> Result<Vec<ConversationRecord>, PersistenceError> {
        let mut records: Vec<ConversationRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.username == username)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }
}
