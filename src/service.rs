//! The request-facing operations, independent of any transport.
//!
//! [`WorkflowService`] owns the process-wide state (tool registry, chat
//! provider, stores) and exposes one method per endpoint. The HTTP layer in
//! [`crate::server`] and the CLI both call into it.
//!
//! # Example
//!
//! ```rust,no_run
//! use agentic_workflow::config::WorkflowConfig;
//! use agentic_workflow::service::{InferenceRequest, WorkflowService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = WorkflowService::from_config(&WorkflowConfig::default()).await?;
//! let response = service
//!     .infer("ada", InferenceRequest::new("What is 12 * 12?"))
//!     .await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

use crate::agent::{Agent, AgentConfig, DEFAULT_TEMPERATURE};
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::llm::{ChatProvider, OpenAIClient, DEFAULT_MODEL};
use crate::memory::{
    ConversationRecord, ConversationStore, InMemoryConversationStore, KnowledgeStore, LibsqlStore,
    NoKnowledge,
};
use crate::prompt::PromptBuilder;
use crate::tools::{DynamicToolCompiler, Tool, ToolError, ToolRegistry, ToolSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

/// Documents requested from the knowledge store per inference.
pub const KNOWLEDGE_LIMIT: usize = 3;

/// Header placed between caller history and knowledge-store context.
pub const KNOWLEDGE_HEADER: &str = "\n[Additional Context from Knowledge Base]\n";

/// Body of an inference request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// The query to be answered
    pub query: String,
    /// Previous reasoning steps
    #[serde(default)]
    pub history: String,
    /// Sampling temperature; the configured default when absent
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Appended to the system prompt on its own line
    #[serde(default)]
    pub system_prompt_extra: String,
}

impl InferenceRequest {
    /// Creates a request with no history, extra instructions or temperature.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            history: String::new(),
            temperature: None,
            system_prompt_extra: String::new(),
        }
    }

    /// Sets the history.
    #[must_use]
    pub fn with_history(mut self, history: impl Into<String>) -> Self {
        self.history = history.into();
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the extra system prompt instructions.
    #[must_use]
    pub fn with_system_prompt_extra(mut self, extra: impl Into<String>) -> Self {
        self.system_prompt_extra = extra.into();
        self
    }
}

/// Result of an inference request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// The agent's reasoning
    pub reasoning: String,
    /// The agent's answer, including any tool output
    pub answer: String,
}

/// Body of a tool creation request.
///
/// Either `code` (a lone call fragment) or `call_code` (optionally with
/// `init_code`) must be given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCreate {
    /// Registry key
    pub name: String,
    /// Usage contract shown to the model
    pub description: String,
    /// Shorthand for a call fragment with an empty init fragment
    #[serde(default)]
    pub code: Option<String>,
    /// Runs once at construction
    #[serde(default)]
    pub init_code: Option<String>,
    /// Runs on every invocation
    #[serde(default)]
    pub call_code: Option<String>,
}

impl ToolCreate {
    /// Creates a request for a tool with a single call fragment.
    #[must_use]
    pub fn inline(
        name: impl Into<String>,
        description: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Creates a request with separate init and call fragments.
    #[must_use]
    pub fn split(
        name: impl Into<String>,
        description: impl Into<String>,
        init_code: impl Into<String>,
        call_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            init_code: Some(init_code.into()),
            call_code: Some(call_code.into()),
            ..Self::default()
        }
    }
}

/// Body of a tool update request. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUpdate {
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New init fragment
    #[serde(default)]
    pub init_code: Option<String>,
    /// New call fragment
    #[serde(default)]
    pub call_code: Option<String>,
}

/// One row of the tool listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    /// Registry key
    pub name: String,
    /// Usage contract
    pub description: String,
    /// "builtin" or "dynamic"
    #[serde(rename = "type")]
    pub kind: String,
}

/// The tool listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolList {
    /// Tools in registration order
    pub tools: Vec<ToolSummary>,
}

/// Confirmation returned by tool management operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "OK" while the service answers
    pub status: String,
    /// Crate version
    pub version: String,
}

/// A rejected request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The specific error that occurred
    pub kind: ApiErrorKind,
}

/// Specific request rejection types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request is malformed or conflicts with current state
    BadRequest {
        /// Explanation for the caller
        detail: String,
    },
    /// The addressed resource does not exist
    NotFound {
        /// Explanation for the caller
        detail: String,
    },
}

impl ApiError {
    /// Creates a new ApiError with the given kind.
    #[must_use]
    pub fn new(kind: ApiErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a 400-class error.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::BadRequest {
            detail: detail.into(),
        })
    }

    /// Creates a 404-class error.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound {
            detail: detail.into(),
        })
    }

    /// Returns the caller-facing explanation.
    #[must_use]
    pub fn detail(&self) -> &str {
        match &self.kind {
            ApiErrorKind::BadRequest { detail } | ApiErrorKind::NotFound { detail } => detail,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind {
            ApiErrorKind::BadRequest { .. } => 400,
            ApiErrorKind::NotFound { .. } => 404,
        }
    }

    /// Returns true for 404-class errors.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ApiErrorKind::NotFound { .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code(), self.detail())
    }
}

impl std::error::Error for ApiError {}

/// Shared handle to the workflow's state. Clones are cheap.
#[derive(Debug, Clone)]
pub struct WorkflowService {
    registry: Arc<ToolRegistry>,
    provider: Arc<dyn ChatProvider>,
    conversations: Arc<dyn ConversationStore>,
    knowledge: Arc<dyn KnowledgeStore>,
    model: String,
    default_temperature: f32,
    tool_snapshot: Option<PathBuf>,
}

impl WorkflowService {
    /// Creates a service over `registry` with in-memory conversations and no
    /// knowledge store.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            provider,
            conversations: Arc::new(InMemoryConversationStore::new()),
            knowledge: Arc::new(NoKnowledge),
            model: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
            tool_snapshot: None,
        }
    }

    /// Assembles the service described by `config`.
    ///
    /// Builds the provider client, opens the libSQL store for conversations
    /// and knowledge, registers the built-in tools and restores the tool
    /// snapshot when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider settings are unusable or the
    /// database cannot be opened.
    pub async fn from_config(config: &WorkflowConfig) -> Result<Self, WorkflowError> {
        let provider_config = config.provider.to_provider_config()?;
        let provider: Arc<dyn ChatProvider> = Arc::new(OpenAIClient::new(&provider_config)?);

        let store = Arc::new(LibsqlStore::open(&config.storage.persistence()).await?);

        let compiler = DynamicToolCompiler::new(config.sandbox.clone());
        let registry = Arc::new(ToolRegistry::with_builtins(compiler));
        if let Some(path) = &config.storage.tool_snapshot {
            let restored = registry.load_snapshot(path).await;
            tracing::info!(path = %path.display(), restored, "Tool snapshot loaded");
        }

        let mut service = Self::new(provider, registry)
            .with_conversation_store(store.clone())
            .with_knowledge_store(store)
            .with_model(config.provider.model.clone())
            .with_default_temperature(config.provider.temperature);
        service.tool_snapshot = config.storage.tool_snapshot.clone();

        tracing::info!(
            provider = %config.provider.kind,
            model = %service.model,
            tools = service.registry.len(),
            "Workflow service ready"
        );
        Ok(service)
    }

    /// Uses `store` for conversation records.
    #[must_use]
    pub fn with_conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversations = store;
        self
    }

    /// Uses `store` for knowledge lookups.
    #[must_use]
    pub fn with_knowledge_store(mut self, store: Arc<dyn KnowledgeStore>) -> Self {
        self.knowledge = store;
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature used when a request does not supply one.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = temperature;
        self
    }

    /// Saves the registry to `path` after every tool change.
    #[must_use]
    pub fn with_tool_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_snapshot = Some(path.into());
        self
    }

    /// Returns the tool registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Answers `request` with a fresh single-step agent.
    ///
    /// # Errors
    ///
    /// Returns a 400-class error for an empty query. Provider, tool and
    /// storage failures are reported inside the answer instead.
    pub async fn infer(
        &self,
        username: &str,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, ApiError> {
        if request.query.trim().is_empty() {
            return Err(ApiError::bad_request("Query must not be empty."));
        }

        let span = tracing::info_span!("inference", username = %username);
        self.run_inference(username, request).instrument(span).await
    }

    async fn run_inference(
        &self,
        username: &str,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, ApiError> {
        tracing::info!("Received inference request");

        let mut history = request.history;
        let context = self.knowledge.search(&request.query, KNOWLEDGE_LIMIT).await;
        if !context.is_empty() {
            history.push_str(KNOWLEDGE_HEADER);
            history.push_str(&context);
        }

        let tools = self.registry.list();
        let system_prompt = PromptBuilder::new(request.query.as_str())
            .history(history)
            .tools(tools.iter().map(|tool| tool.definition().prompt_line()))
            .extra_instructions(request.system_prompt_extra)
            .build();

        let config = AgentConfig::new(system_prompt)
            .with_model(self.model.clone())
            .with_temperature(request.temperature.unwrap_or(self.default_temperature))
            .with_username(username);
        let mut agent = Agent::new(config, Arc::clone(&self.provider), tools)
            .with_conversation_store(Arc::clone(&self.conversations));

        let decision = agent.decide(&request.query).await;

        tracing::info!(
            conversation_id = %agent.conversation_id(),
            answer_len = decision.answer.len(),
            "Inference completed"
        );
        Ok(InferenceResponse {
            reasoning: decision.reasoning,
            answer: decision.answer,
        })
    }

    /// Returns every stored conversation step for `username`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a 404-class error when the user has none. An unreachable
    /// store is logged and reported the same way.
    pub async fn conversations(&self, username: &str) -> Result<Vec<ConversationRecord>, ApiError> {
        let records = self.conversations.query(username).await.unwrap_or_else(|e| {
            tracing::warn!(username, error = %e, "Conversation query failed");
            Vec::new()
        });

        if records.is_empty() {
            return Err(ApiError::not_found(format!(
                "No conversations found for user {username}"
            )));
        }
        Ok(records)
    }

    /// Reports liveness and version.
    #[must_use]
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "OK".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Lists tools in registration order.
    #[must_use]
    pub fn list_tools(&self) -> ToolList {
        let tools = self
            .registry
            .list()
            .iter()
            .map(|tool| ToolSummary {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                kind: tool.definition().source.label().to_string(),
            })
            .collect();
        ToolList { tools }
    }

    /// Synthesizes and registers a new tool.
    ///
    /// # Errors
    ///
    /// Returns a 400-class error when a field is empty, no code is given,
    /// the name is taken, or the source does not compile or initialize.
    pub async fn add_tool(&self, request: ToolCreate) -> Result<MessageResponse, ApiError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::bad_request("Tool name must not be empty."));
        }
        if request.description.trim().is_empty() {
            return Err(ApiError::bad_request("Tool description must not be empty."));
        }
        if self.registry.contains(&name) {
            return Err(ApiError::bad_request(format!("Tool {name} already exists.")));
        }

        let call_code = request
            .call_code
            .or(request.code)
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| {
                ApiError::bad_request("Tool code is required: provide 'code' or 'call_code'.")
            })?;
        let init_code = request.init_code.unwrap_or_default();

        let tool = self
            .synthesize(&name, request.description, init_code, call_code)
            .await?;
        self.registry.register_new(tool).map_err(|e| {
            if e.is_already_registered() {
                ApiError::bad_request(format!("Tool {name} already exists."))
            } else {
                ApiError::bad_request(e.to_string())
            }
        })?;
        self.persist_tools().await;
        Ok(MessageResponse::new(format!("Tool {name} added successfully.")))
    }

    /// Changes a tool's description, its code, or both.
    ///
    /// A missing fragment keeps the tool's current one. Giving code for a
    /// built-in replaces it with a synthesized tool.
    ///
    /// # Errors
    ///
    /// Returns a 404-class error for an unknown tool and a 400-class error
    /// when the new source fails to compile or initialize.
    pub async fn update_tool(
        &self,
        name: &str,
        update: ToolUpdate,
    ) -> Result<MessageResponse, ApiError> {
        let existing = self
            .registry
            .get(name)
            .ok_or_else(|| ApiError::not_found(format!("Tool {name} not found.")))?;

        if update.init_code.is_none() && update.call_code.is_none() {
            if let Some(description) = update.description {
                self.registry
                    .update_description(name, &description)
                    .map_err(|e| ApiError::not_found(e.to_string()))?;
            }
        } else {
            let (current_init, current_call) = match &existing.definition().source {
                ToolSource::Synthesized {
                    init_code,
                    call_code,
                } => (init_code.clone(), call_code.clone()),
                ToolSource::Builtin => (String::new(), String::new()),
            };
            let description = update
                .description
                .unwrap_or_else(|| existing.description().to_string());
            let init_code = update.init_code.unwrap_or(current_init);
            let call_code = update.call_code.unwrap_or(current_call);

            let tool = self
                .synthesize(name, description, init_code, call_code)
                .await?;
            self.registry.register(tool);
        }

        self.persist_tools().await;
        Ok(MessageResponse::new(format!("Tool {name} updated successfully.")))
    }

    /// Removes a tool.
    ///
    /// # Errors
    ///
    /// Returns a 404-class error for an unknown tool.
    pub async fn delete_tool(&self, name: &str) -> Result<MessageResponse, ApiError> {
        if !self.registry.remove(name) {
            return Err(ApiError::not_found(format!("Tool {name} not found.")));
        }
        self.persist_tools().await;
        Ok(MessageResponse::new(format!("Tool {name} deleted successfully.")))
    }

    /// Compiles on the blocking pool, since the init fragment runs eagerly.
    async fn synthesize(
        &self,
        name: &str,
        description: String,
        init_code: String,
        call_code: String,
    ) -> Result<Tool, ApiError> {
        let registry = Arc::clone(&self.registry);
        let tool_name = name.to_string();
        tokio::task::spawn_blocking(move || {
            registry.synthesize(&tool_name, &description, &init_code, &call_code)
        })
        .await
        .map_err(|e| ToolError::internal(format!("tool synthesis task failed: {e}")))
        .and_then(|result| result)
        .map_err(|e| ApiError::bad_request(format!("Failed to create tool {name}: {e}")))
    }

    async fn persist_tools(&self) {
        let Some(path) = &self.tool_snapshot else {
            return;
        };
        if let Err(e) = self.registry.save_snapshot(path).await {
            tracing::warn!(error = %e, "Tool snapshot not saved");
        }
    }
}
