//! Chat provider module.
//!
//! The [`ChatProvider`] trait and its OpenAI-compatible HTTP implementation
//! (Groq, OpenAI, Ollama, custom endpoints).

mod client;
mod config;
mod error;
mod openai;

pub use client::ChatProvider;
pub use config::{ProviderConfig, ProviderKind, DEFAULT_MODEL};
pub use error::{LLMError, LLMErrorKind};
pub use openai::OpenAIClient;
