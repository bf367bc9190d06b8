//! Wikipedia search built-in tool.
//!
//! Queries the MediaWiki search API and returns the first hit's snippet with
//! its highlight markup removed.

use crate::tools::definition::{ToolDefinition, ToolExecutionFuture, ToolExecutor};
use crate::tools::error::ToolError;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Public MediaWiki API endpoint for English Wikipedia.
pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Returned when the search has no hits.
pub const NO_RESULTS: &str = "No results found on Wikipedia.";

const USER_AGENT: &str = concat!("agentic-workflow/", env!("CARGO_PKG_VERSION"));

/// Wikipedia tool executor.
#[derive(Debug, Clone)]
pub struct WikipediaTool {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    snippet: String,
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WikipediaTool {
    /// Creates a tool that searches English Wikipedia.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(WIKIPEDIA_API_URL, Duration::from_secs(15))
    }

    /// Creates a tool against another MediaWiki endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "wikipedia",
            "Searches Wikipedia for information. Example: wikipedia: Django",
        )
    }
}

/// Extracts the first snippet from a search response body.
fn first_snippet(body: &str) -> Result<String, ToolError> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| {
        ToolError::execution_failed("wikipedia", format!("Error searching Wikipedia: {e}"))
    })?;

    let snippet = response
        .query
        .and_then(|query| query.search.into_iter().next())
        .map(|hit| strip_markup(&hit.snippet))
        .filter(|snippet| !snippet.is_empty());

    Ok(snippet.unwrap_or_else(|| NO_RESULTS.to_string()))
}

fn strip_markup(snippet: &str) -> String {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    let stripped = match TAGS.get_or_init(|| Regex::new(r"<[^>]+>").ok()) {
        Some(tags) => tags.replace_all(snippet, "").into_owned(),
        None => snippet.to_string(),
    };
    stripped
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

impl ToolExecutor for WikipediaTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            let query = input.trim();
            if query.is_empty() {
                return Err(ToolError::validation_failed(
                    "wikipedia",
                    "search query cannot be empty",
                ));
            }

            tracing::info!(query, "Searching Wikipedia");

            let response = client
                .get(&endpoint)
                .query(&[
                    ("action", "query"),
                    ("list", "search"),
                    ("srsearch", query),
                    ("format", "json"),
                ])
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| {
                    ToolError::execution_failed("wikipedia", format!("Error searching Wikipedia: {e}"))
                })?;

            let body = response.text().await.map_err(|e| {
                ToolError::execution_failed("wikipedia", format!("Error searching Wikipedia: {e}"))
            })?;

            first_snippet(&body)
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
