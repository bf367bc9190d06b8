//! The decision-step agent.
//!
//! An [`Agent`] owns one transcript and performs exactly one decision step
//! per [`Agent::decide`] call: ask the provider, parse the reply, dispatch at
//! most one tool, record the outcome. Tool output is not fed back to the
//! model for a further step.

mod config;
mod runtime;
mod state;

pub use config::{AgentConfig, DEFAULT_TEMPERATURE, DEFAULT_USERNAME};
pub use runtime::{
    Agent, Decision, DispatchOutcome, EXECUTED_ACTION_MARKER, PROVIDER_FAILURE_PREFIX,
};
pub use state::AgentState;
