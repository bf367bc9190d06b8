//! # Agentic Workflow
//!
//! A single-step reasoning agent backed by a tool registry that can grow at
//! runtime.
//!
//! ## Architecture
//!
//! - **Agent**: one decision step per query: ask the model, parse its reply,
//!   dispatch at most one tool, persist the transcript
//! - **Parser**: recovers a thought, an action or an answer from free-form
//!   model output, degrading gracefully
//! - **Tool Registry**: built-in tools plus tools synthesized from script
//!   source, with snapshot persistence
//! - **Memory**: conversation records and knowledge-base context, in memory
//!   or in libSQL
//! - **Service / Server**: inference and tool management over HTTP
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agentic_workflow::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(OpenAIClient::new(&ProviderConfig::groq("gsk_..."))?);
//! let registry = ToolRegistry::with_builtins(DynamicToolCompiler::default());
//!
//! let prompt = PromptBuilder::new("What is 6 * 7?")
//!     .tools(registry.list().iter().map(|t| t.definition().prompt_line()))
//!     .build();
//! let mut agent = Agent::from_registry(AgentConfig::new(prompt), provider, &registry);
//!
//! let decision = agent.decide("What is 6 * 7?").await;
//! println!("{}", decision.answer);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod memory;
pub mod messages;
pub mod parser;
pub mod prompt;
pub mod server;
pub mod service;
pub mod tools;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentConfig, AgentState, Decision, DispatchOutcome};
    pub use crate::config::WorkflowConfig;
    pub use crate::error::{WorkflowError, WorkflowErrorKind};
    pub use crate::llm::{ChatProvider, LLMError, OpenAIClient, ProviderConfig, ProviderKind};
    pub use crate::memory::{
        ConversationRecord, ConversationStore, InMemoryConversationStore, InMemoryKnowledgeStore,
        KnowledgeStore,
    };
    pub use crate::messages::{Message, MessageRole};
    pub use crate::parser::{ParsedDecision, ResponseParser, ToolAction};
    pub use crate::prompt::{PromptBuilder, PromptSection};
    pub use crate::service::{ApiError, InferenceRequest, InferenceResponse, WorkflowService};
    pub use crate::tools::{
        DynamicToolCompiler, NamespacePolicy, Tool, ToolDefinition, ToolError, ToolRegistry,
    };
    pub use crate::types::ConversationId;
}
