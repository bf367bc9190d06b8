//! Agent state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an agent is in its decision step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AgentState {
    /// Constructed or finished a step; ready for a query
    #[default]
    Idle,
    /// A provider call or tool dispatch is in flight
    Executing,
}

impl AgentState {
    /// Returns true if the agent can accept a new query.
    #[must_use]
    pub fn can_accept_query(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Executing => write!(f, "executing"),
        }
    }
}
