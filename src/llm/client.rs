//! Chat provider abstraction.
//!
//! The agent only needs one operation from a language model: turn a
//! transcript into the next assistant reply. Keeping that behind a trait lets
//! the HTTP client be swapped for a scripted fake in tests.

use crate::llm::error::LLMError;
use crate::messages::Message;
use async_trait::async_trait;

/// A chat-completion backend.
///
/// # Example
///
/// ```ignore
/// use agentic_workflow::llm::{ChatProvider, OpenAIClient, ProviderConfig};
/// use agentic_workflow::messages::Message;
///
/// let client = OpenAIClient::new(&ProviderConfig::groq(key))?;
/// let reply = client
///     .complete("llama-3.3-70b-versatile", &[Message::user("Hi")], 0.7)
///     .await?;
/// ```
#[async_trait]
pub trait ChatProvider: Send + Sync + std::fmt::Debug {
    /// Requests one completion for the full transcript.
    ///
    /// # Errors
    ///
    /// Returns an [`LLMError`] on network, authentication, rate-limit or
    /// response-format problems.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        temperature: f32,
    ) -> Result<String, LLMError>;

    /// Returns the name of this provider for logging.
    fn provider_name(&self) -> &'static str;
}
