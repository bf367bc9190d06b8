//! One decision step: provider call, parse, optional dispatch, record.

use crate::agent::config::AgentConfig;
use crate::agent::state::AgentState;
use crate::llm::ChatProvider;
use crate::memory::{ConversationRecord, ConversationStore};
use crate::messages::Message;
use crate::parser::{ParsedDecision, ResponseParser, ToolAction};
use crate::tools::{Tool, ToolRegistry};
use crate::types::ConversationId;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

/// Marker placed between model prose and tool output in an answer.
pub const EXECUTED_ACTION_MARKER: &str = "[Executed Action]";

/// Prefix of the synthetic answer produced when the provider fails.
pub const PROVIDER_FAILURE_PREFIX: &str = "Error: Failed to get response from LLM:";

/// What happened to the action a model requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The tool ran and returned text
    Executed {
        /// Registered name of the tool
        tool_name: String,
        /// The tool's output
        output: String,
    },
    /// The tool was found but its invocation failed
    Failed {
        /// Registered name of the tool
        tool_name: String,
        /// Why the call failed
        error: String,
    },
    /// No tool matched the requested name
    NoMatchingTool {
        /// The name the model asked for
        tool_name: String,
    },
}

impl DispatchOutcome {
    /// The annotation appended to the answer.
    #[must_use]
    pub fn annotation(&self) -> String {
        match self {
            Self::Executed { output, .. } => format!("{EXECUTED_ACTION_MARKER}\n{output}"),
            Self::Failed { error, .. } => {
                format!("{EXECUTED_ACTION_MARKER}\n[Action execution failed: {error}]")
            }
            Self::NoMatchingTool { tool_name } => {
                format!("[No matching tool found for action: {tool_name}]")
            }
        }
    }

    /// Returns true if a tool ran to completion.
    #[must_use]
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }
}

/// The result of one decision step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The model's reasoning
    pub reasoning: String,
    /// The answer, with any dispatch annotation appended
    pub answer: String,
    /// What happened to the requested action, if there was one
    pub dispatch: Option<DispatchOutcome>,
}

/// A single-conversation agent.
///
/// Each instance draws its own [`ConversationId`] and owns its transcript;
/// agents are never shared across requests. The tool set is a snapshot
/// taken at construction, so registry changes made while a step runs do not
/// affect it.
pub struct Agent {
    conversation_id: ConversationId,
    config: AgentConfig,
    provider: Arc<dyn ChatProvider>,
    tools: Vec<Tool>,
    conversations: Option<Arc<dyn ConversationStore>>,
    parser: ResponseParser,
    transcript: Vec<Message>,
    state: AgentState,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("conversation_id", &self.conversation_id)
            .field("model", &self.config.model)
            .field("username", &self.config.username)
            .field("provider", &self.provider.provider_name())
            .field("tools", &self.tools.len())
            .field("transcript_len", &self.transcript.len())
            .field("state", &self.state)
            .finish()
    }
}

impl Agent {
    /// Creates an agent with an explicit tool set.
    ///
    /// A non-empty system prompt becomes the first transcript turn.
    #[must_use]
    pub fn new(config: AgentConfig, provider: Arc<dyn ChatProvider>, tools: Vec<Tool>) -> Self {
        let mut transcript = Vec::new();
        if !config.system_prompt.is_empty() {
            transcript.push(Message::system(config.system_prompt.clone()));
        }

        Self {
            conversation_id: ConversationId::new(),
            config,
            provider,
            tools,
            conversations: None,
            parser: ResponseParser::new(),
            transcript,
            state: AgentState::Idle,
        }
    }

    /// Creates an agent over a snapshot of the registry's current tools.
    #[must_use]
    pub fn from_registry(
        config: AgentConfig,
        provider: Arc<dyn ChatProvider>,
        registry: &ToolRegistry,
    ) -> Self {
        Self::new(config, provider, registry.list())
    }

    /// Records every completed step in `store`.
    #[must_use]
    pub fn with_conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversations = Some(store);
        self
    }

    /// Returns this agent's conversation identifier.
    #[must_use]
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Returns the transcript so far.
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Returns the agent's configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Case-insensitive lookup in the tool snapshot, preferring an exact match.
    fn find_tool(&self, name: &str) -> Option<&Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .or_else(|| {
                self.tools
                    .iter()
                    .find(|tool| tool.name().eq_ignore_ascii_case(name))
            })
    }

    /// Performs one decision step for `query`.
    ///
    /// Never fails: provider errors become a synthetic answer, tool errors
    /// become annotations and persistence errors are logged. Exactly one
    /// assistant turn is appended to the transcript.
    pub async fn decide(&mut self, query: &str) -> Decision {
        let span = tracing::info_span!(
            "decide",
            conversation_id = %self.conversation_id,
            username = %self.config.username
        );
        self.step(query).instrument(span).await
    }

    async fn step(&mut self, query: &str) -> Decision {
        if !query.is_empty() {
            self.transcript.push(Message::user(query));
        }

        self.state = AgentState::Executing;

        let (raw, parsed) = match self
            .provider
            .complete(&self.config.model, &self.transcript, self.config.temperature)
            .await
        {
            Ok(reply) => {
                tracing::debug!(reply_len = reply.len(), "Provider replied");
                let parsed = self.parser.parse(&reply);
                (reply, parsed)
            }
            Err(e) => {
                tracing::warn!(provider = self.provider.provider_name(), error = %e, "Provider call failed");
                let synthetic = format!("{PROVIDER_FAILURE_PREFIX} {e}");
                let parsed = ParsedDecision {
                    answer: Some(synthetic.clone()),
                    ..ParsedDecision::default()
                };
                (synthetic, parsed)
            }
        };

        let dispatch = match &parsed.action {
            Some(action) => Some(self.dispatch(action).await),
            None => None,
        };

        let mut answer = parsed.answer.clone().unwrap_or_default();
        if answer.trim().is_empty() && dispatch.is_none() {
            answer = raw.trim().to_string();
        }

        let mut assistant_turn = raw;
        if let Some(outcome) = &dispatch {
            let annotation = outcome.annotation();
            append_block(&mut answer, &annotation);
            append_block(&mut assistant_turn, &annotation);
        }

        self.transcript.push(Message::assistant(assistant_turn));
        self.persist().await;
        self.state = AgentState::Idle;

        Decision {
            reasoning: parsed.thought,
            answer,
            dispatch,
        }
    }

    /// Runs the requested tool at most once.
    ///
    /// The call runs on its own task so that even a panicking tool is
    /// reported as a failure instead of unwinding through the step. The task
    /// is aborted if the step itself is dropped.
    async fn dispatch(&self, action: &ToolAction) -> DispatchOutcome {
        let Some(tool) = self.find_tool(&action.tool_name).cloned() else {
            tracing::warn!(tool_name = %action.tool_name, "No matching tool for action");
            return DispatchOutcome::NoMatchingTool {
                tool_name: action.tool_name.clone(),
            };
        };

        let tool_name = tool.name().to_string();
        let input = action.input_text.clone();
        tracing::info!(tool_name = %tool_name, reason = %action.reason, "Dispatching action");

        let outcome = AbortOnDrop(tokio::spawn(async move { tool.invoke(&input).await })).await;

        match outcome {
            Ok(Ok(output)) => DispatchOutcome::Executed { tool_name, output },
            Ok(Err(e)) => {
                tracing::warn!(tool_name = %tool_name, error = %e, "Action execution failed");
                DispatchOutcome::Failed {
                    tool_name,
                    error: e.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(tool_name = %tool_name, error = %e, "Action task aborted");
                DispatchOutcome::Failed {
                    tool_name,
                    error: format!("tool task aborted: {e}"),
                }
            }
        }
    }

    async fn persist(&self) {
        let Some(store) = &self.conversations else {
            return;
        };

        let record = ConversationRecord::new(
            self.config.username.clone(),
            self.conversation_id.clone(),
            self.transcript.clone(),
        );

        if let Err(e) = store.append(record).await {
            tracing::warn!(error = %e, "Failed to persist conversation");
        }
    }
}

/// Awaits a spawned task and aborts it if dropped first.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Appends `block` after a blank line, or as-is when `text` is empty.
fn append_block(text: &mut String, block: &str) {
    if !text.trim().is_empty() {
        text.push_str("\n\n");
    } else {
        text.clear();
    }
    text.push_str(block);
}
