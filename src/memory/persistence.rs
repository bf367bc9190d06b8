//! libSQL-backed stores.
//!
//! One database holds both conversation records and knowledge documents.
//! The connection sits behind an async mutex so a `:memory:` database keeps
//! its single connection for the lifetime of the store.

use crate::memory::conversation::{ConversationRecord, ConversationStore};
use crate::memory::error::PersistenceError;
use crate::memory::knowledge::{rank_documents, KnowledgeStore};
use crate::types::ConversationId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database};
use tokio::sync::Mutex;

/// Database schema version for migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// SQL statements for schema creation.
const CREATE_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS conversations (
    conversation_id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    messages TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_username ON conversations(username, timestamp);

CREATE TABLE IF NOT EXISTS knowledge (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
";

/// Configuration for the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Path to the database file
    pub db_path: String,
}

impl PersistenceConfig {
    /// Creates a new persistence config with the given database path.
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Creates a config for an in-memory database (for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// Returns true if this is an in-memory database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.db_path == ":memory:"
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self::new("agentic-workflow.db")
    }
}

/// Opens a database.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
pub async fn open_database(config: &PersistenceConfig) -> Result<Database, PersistenceError> {
    libsql::Builder::new_local(&config.db_path)
        .build()
        .await
        .map_err(|e| PersistenceError::database_open(&config.db_path, e.to_string()))
}

/// Creates the tables if they do not exist.
///
/// # Errors
///
/// Returns an error if the schema cannot be created.
pub async fn initialize_schema(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute_batch(CREATE_SCHEMA)
        .await
        .map_err(|e| PersistenceError::schema_init(e.to_string()))?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )
    .await
    .map_err(|e| PersistenceError::schema_init(e.to_string()))?;

    Ok(())
}

/// Conversation and knowledge storage in a libSQL database.
#[derive(Debug)]
pub struct LibsqlStore {
    // Kept alive for the connection's sake.
    _db: Database,
    conn: Mutex<Connection>,
}

impl LibsqlStore {
    /// Opens (creating if needed) the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub async fn open(config: &PersistenceConfig) -> Result<Self, PersistenceError> {
        let db = open_database(config).await?;
        let conn = db
            .connect()
            .map_err(|e| PersistenceError::connection_error(e.to_string()))?;
        initialize_schema(&conn).await?;

        tracing::info!(path = %config.db_path, "Database opened");

        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        Self::open(&PersistenceConfig::in_memory()).await
    }
}

#[async_trait]
impl ConversationStore for LibsqlStore {
    async fn append(&self, record: ConversationRecord) -> Result<(), PersistenceError> {
        let messages = serde_json::to_string(&record.messages)
            .map_err(|e| PersistenceError::serialization_failed(e.to_string()))?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO conversations (conversation_id, username, timestamp, messages)
             VALUES (?1, ?2, ?3, ?4)",
            libsql::params![
                record.conversation_id.to_string(),
                record.username,
                record.timestamp.to_rfc3339(),
                messages,
            ],
        )
        .await
        .map_err(|e| PersistenceError::query_failed("append_conversation", e.to_string()))?;

        Ok(())
    }

    async fn query(&self, username: &str) -> Result<Vec<ConversationRecord>, PersistenceError> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT conversation_id, username, timestamp, messages FROM conversations
                 WHERE username = ?1 ORDER BY timestamp ASC",
                [username],
            )
            .await
            .map_err(|e| PersistenceError::query_failed("query_conversations", e.to_string()))?;

        let mut records = Vec::new();

        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PersistenceError::query_failed("query_conversations", e.to_string()))?
        {
            let id: String = row
                .get(0)
                .map_err(|e| PersistenceError::deserialization_failed(e.to_string()))?;
            let username: String = row
                .get(1)
                .map_err(|e| PersistenceError::deserialization_failed(e.to_string()))?;
            let timestamp: String = row
                .get(2)
                .map_err(|e| PersistenceError::deserialization_failed(e.to_string()))?;
            let messages: String = row
                .get(3)
                .map_err(|e| PersistenceError::deserialization_failed(e.to_string()))?;

            records.push(ConversationRecord {
                username,
                conversation_id: ConversationId::parse(&id)
                    .map_err(|e| PersistenceError::deserialization_failed(e.to_string()))?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map_err(|e| PersistenceError::deserialization_failed(e.to_string()))?
                    .with_timezone(&Utc),
                messages: serde_json::from_str(&messages)
                    .map_err(|e| PersistenceError::deserialization_failed(e.to_string()))?,
            });
        }

        Ok(records)
    }
}

#[async_trait]
impl KnowledgeStore for LibsqlStore {
    async fn search(&self, query: &str, limit: usize) -> String {
        let conn = self.conn.lock().await;
        let mut rows = match conn
            .query("SELECT content FROM knowledge ORDER BY id ASC", ())
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "Knowledge search failed");
                return String::new();
            }
        };

        let mut documents = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => match row.get::<String>(0) {
                    Ok(content) => documents.push(content),
                    Err(e) => tracing::warn!(error = %e, "Skipping unreadable knowledge row"),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Knowledge search interrupted");
                    break;
                }
            }
        }

        rank_documents(query, documents.iter().map(String::as_str), limit)
    }

    async fn add_document(&self, content: &str) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().await;
        conn.execute("INSERT INTO knowledge (content) VALUES (?1)", [content])
            .await
            .map_err(|e| PersistenceError::query_failed("add_document", e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Message;
    use tempfile::TempDir;

    #[test]
    fn persistence_config_in_memory() {
        let config = PersistenceConfig::in_memory();
        assert_eq!(config.db_path, ":memory:");
        assert!(config.is_in_memory());
        assert!(!PersistenceConfig::default().is_in_memory());
    }

    #[tokio::test]
    async fn conversations_round_trip() {
        let store = LibsqlStore::in_memory().await.unwrap();
        let record = ConversationRecord::new(
            "ada",
            ConversationId::new(),
            vec![Message::system("sys"), Message::user("q"), Message::assistant("a")],
        );

        store.append(record.clone()).await.unwrap();
        store
            .append(ConversationRecord::new("bob", ConversationId::new(), vec![]))
            .await
            .unwrap();

        let records = store.query("ada").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].conversation_id, record.conversation_id);
        assert_eq!(records[0].messages, record.messages);
        assert_eq!(records[0].timestamp.timestamp(), record.timestamp.timestamp());
    }

    #[tokio::test]
    async fn unknown_user_has_no_records() {
        let store = LibsqlStore::in_memory().await.unwrap();
        assert!(store.query("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn knowledge_search_ranks_documents() {
        let store = LibsqlStore::in_memory().await.unwrap();
        store.add_document("Tokio is an async runtime.").await.unwrap();
        store.add_document("Bread needs yeast.").await.unwrap();

        assert_eq!(store.search("async runtime", 3).await, "Tokio is an async runtime.");
        assert_eq!(store.search("quantum", 3).await, "");
    }

    #[tokio::test]
    async fn file_database_persists() {
        let dir = TempDir::new().unwrap();
        let config = PersistenceConfig::new(dir.path().join("data.db").to_string_lossy());

        {
            let store = LibsqlStore::open(&config).await.unwrap();
            store
                .append(ConversationRecord::new("ada", ConversationId::new(), vec![]))
                .await
                .unwrap();
        }

        let reopened = LibsqlStore::open(&config).await.unwrap();
        assert_eq!(reopened.query("ada").await.unwrap().len(), 1);
    }
}
