//! Knowledge-base lookup used to enrich the agent's context.

use crate::memory::error::PersistenceError;
use async_trait::async_trait;
use std::fmt::Debug;
use tokio::sync::RwLock;

/// Source of supplementary context for a query.
#[async_trait]
pub trait KnowledgeStore: Send + Sync + Debug {
    /// Returns up to `limit` relevant documents joined by newlines.
    ///
    /// Best-effort: an unavailable store yields an empty string.
    async fn search(&self, query: &str, limit: usize) -> String;

    /// Adds a document to the store.
    async fn add_document(&self, content: &str) -> Result<(), PersistenceError>;
}

/// Lowercased alphanumeric terms of `text`, at least two characters long.
fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

/// Ranks documents by how many query-term occurrences they contain.
///
/// Documents without any hit are dropped. Ties keep insertion order.
pub(crate) fn rank_documents<'a, I>(query: &str, documents: I, limit: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let query_terms = terms(query);
    if query_terms.is_empty() || limit == 0 {
        return String::new();
    }

    let mut scored: Vec<(usize, &str)> = documents
        .into_iter()
        .filter_map(|document| {
            let document_terms = terms(document);
            let score = document_terms
                .iter()
                .filter(|term| query_terms.contains(term))
                .count();
            (score > 0).then_some((score, document))
        })
        .collect();

    // Stable sort keeps insertion order for equal scores.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, document)| document)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A [`KnowledgeStore`] over documents held in memory.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    documents: RwLock<Vec<String>>,
}

impl InMemoryKnowledgeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `documents`.
    #[must_use]
    pub fn with_documents<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            documents: RwLock::new(documents.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn search(&self, query: &str, limit: usize) -> String {
        let documents = self.documents.read().await;
        rank_documents(query, documents.iter().map(String::as_str), limit)
    }

    async fn add_document(&self, content: &str) -> Result<(), PersistenceError> {
        self.documents.write().await.push(content.to_string());
        Ok(())
    }
}

/// A [`KnowledgeStore`] with no documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKnowledge;

#[async_trait]
impl KnowledgeStore for NoKnowledge {
    async fn search(&self, _query: &str, _limit: usize) -> String {
        String::new()
    }

    async fn add_document(&self, _content: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::connection_error(
            "no knowledge store is configured",
        ))
    }
}
