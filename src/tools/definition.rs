//! Tool contract and executor trait.
//!
//! A [`Tool`] pairs an immutable [`ToolDefinition`] (name, description and,
//! for synthesized tools, the source it was built from) with an executor
//! implementing [`ToolExecutor`]. Built-ins and synthesized tools differ
//! only in which executor they carry.

use crate::tools::error::ToolError;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Default per-call timeout for tools that do not choose their own.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a tool's behavior comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolSource {
    /// A fixed native implementation
    Builtin,
    /// Compiled at runtime from caller-supplied fragments
    #[serde(rename = "dynamic")]
    Synthesized {
        /// Runs once when the tool is constructed
        init_code: String,
        /// Runs on every invocation with `input` in scope
        call_code: String,
    },
}

impl ToolSource {
    /// Short label used in listings and snapshots.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Synthesized { .. } => "dynamic",
        }
    }
}

/// The textual contract of a tool as shown to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    /// Unique key within a registry
    pub name: String,
    /// Usage contract, including the invocation signature
    pub description: String,
    /// Native or synthesized
    pub source: ToolSource,
}

impl ToolDefinition {
    /// Creates a definition for a built-in tool.
    #[must_use]
    pub fn builtin(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            source: ToolSource::Builtin,
        }
    }

    /// Creates a definition for a synthesized tool.
    #[must_use]
    pub fn synthesized(
        name: impl Into<String>,
        description: impl Into<String>,
        init_code: impl Into<String>,
        call_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            source: ToolSource::Synthesized {
                init_code: init_code.into(),
                call_code: call_code.into(),
            },
        }
    }

    /// Renders the `name: description` line used in prompts.
    #[must_use]
    pub fn prompt_line(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }
}

/// The result type for tool execution futures.
pub type ToolExecutionFuture = Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send>>;

/// Trait for executing tools.
///
/// Every tool takes a single text input and produces text.
///
/// # Example
///
/// ```rust
/// use agentic_workflow::tools::{ToolExecutionFuture, ToolExecutor};
///
/// #[derive(Debug)]
/// struct EchoTool;
///
/// impl ToolExecutor for EchoTool {
///     fn execute(&self, input: String) -> ToolExecutionFuture {
///         Box::pin(async move { Ok(input) })
///     }
/// }
/// ```
pub trait ToolExecutor: Send + Sync + Debug {
    /// Runs the tool on `input`.
    fn execute(&self, input: String) -> ToolExecutionFuture;

    /// Upper bound on a single call.
    fn timeout(&self) -> Duration {
        DEFAULT_TOOL_TIMEOUT
    }
}

/// A registered capability: definition plus behavior.
///
/// Cloning is cheap; clones share the executor.
#[derive(Debug, Clone)]
pub struct Tool {
    definition: Arc<ToolDefinition>,
    executor: Arc<dyn ToolExecutor>,
}

impl Tool {
    /// Creates a tool from a definition and an executor.
    #[must_use]
    pub fn new(definition: ToolDefinition, executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            definition: Arc::new(definition),
            executor,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.definition.description
    }

    /// Returns the full definition.
    #[must_use]
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Returns true if the tool was compiled from source at runtime.
    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        matches!(self.definition.source, ToolSource::Synthesized { .. })
    }

    /// Returns a copy of this tool with a different description.
    ///
    /// The executor, and with it any state a synthesized tool holds, is shared.
    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        let mut definition = (*self.definition).clone();
        definition.description = description.into();
        Self {
            definition: Arc::new(definition),
            executor: Arc::clone(&self.executor),
        }
    }

    /// Invokes the tool, bounded by the executor's timeout.
    ///
    /// # Errors
    ///
    /// Returns the executor's error, or [`ToolError::timeout`] if the call
    /// does not finish in time.
    pub async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let limit = self.executor.timeout();
        let call = self.executor.execute(input.to_string());

        tracing::debug!(tool_name = %self.name(), input_len = input.len(), "Invoking tool");

        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::timeout(self.name(), limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::error::ToolErrorKind;

    #[derive(Debug)]
    struct Upper;

    impl ToolExecutor for Upper {
        fn execute(&self, input: String) -> ToolExecutionFuture {
            Box::pin(async move { Ok(input.to_uppercase()) })
        }
    }

    #[derive(Debug)]
    struct Sleeper;

    impl ToolExecutor for Sleeper {
        fn execute(&self, _input: String) -> ToolExecutionFuture {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            })
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(20)
        }
    }

    #[tokio::test]
    async fn invoke_runs_executor() {
        let tool = Tool::new(ToolDefinition::builtin("upper", "Uppercases"), Arc::new(Upper));
        assert_eq!(tool.invoke("abc").await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn invoke_enforces_timeout() {
        let tool = Tool::new(ToolDefinition::builtin("slow", "Sleeps"), Arc::new(Sleeper));
        let error = tool.invoke("x").await.unwrap_err();
        assert!(matches!(error.kind(), ToolErrorKind::Timeout { .. }));
        assert!(error.to_string().contains("slow"));
    }

    #[test]
    fn with_description_keeps_name_and_source() {
        let tool = Tool::new(
            ToolDefinition::synthesized("t", "old", "", "input"),
            Arc::new(Upper),
        );
        let renamed = tool.with_description("new");
        assert_eq!(renamed.name(), "t");
        assert_eq!(renamed.description(), "new");
        assert!(renamed.is_synthesized());
        assert_eq!(tool.description(), "old");
    }

    #[test]
    fn prompt_line_joins_name_and_description() {
        let definition = ToolDefinition::builtin("calculate", "Evaluates math");
        assert_eq!(definition.prompt_line(), "calculate: Evaluates math");
    }

    #[test]
    fn source_labels() {
        assert_eq!(ToolSource::Builtin.label(), "builtin");
        let synthesized = ToolDefinition::synthesized("a", "b", "c", "d").source;
        assert_eq!(synthesized.label(), "dynamic");
    }
}
