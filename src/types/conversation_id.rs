//! Conversation identifier in TypeID format.
//!
//! Every [`Agent`](crate::agent::Agent) draws a fresh identifier when it is
//! constructed, so each decision step lands in the conversation store under
//! its own key. Format: `conv_01h455vb4pex5vsknk084sn02q`

use mti::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A time-sortable, globally unique conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId(MagicTypeId);

/// Error returned when a string is not a valid conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidConversationId {
    /// The string is not a TypeID at all
    Parse(String),
    /// The TypeID carries a prefix other than `conv`
    WrongPrefix {
        /// The prefix conversation identifiers use
        expected: &'static str,
        /// The prefix that was found
        actual: String,
    },
}

impl fmt::Display for InvalidConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid conversation ID: {e}"),
            Self::WrongPrefix { expected, actual } => {
                write!(
                    f,
                    "conversation ID must start with '{expected}_', got prefix '{actual}'"
                )
            }
        }
    }
}

impl std::error::Error for InvalidConversationId {}

impl ConversationId {
    /// TypeID prefix for conversation identifiers.
    pub const PREFIX: &'static str = "conv";

    /// Generates a new identifier backed by a UUIDv7.
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Parses an identifier, rejecting TypeIDs with a foreign prefix.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConversationId::Parse`] for malformed input and
    /// [`InvalidConversationId::WrongPrefix`] for a TypeID of another kind.
    pub fn parse(s: &str) -> Result<Self, InvalidConversationId> {
        let id =
            MagicTypeId::from_str(s).map_err(|e| InvalidConversationId::Parse(e.to_string()))?;

        let prefix = id.prefix().as_str();
        if prefix != Self::PREFIX {
            return Err(InvalidConversationId::WrongPrefix {
                expected: Self::PREFIX,
                actual: prefix.to_string(),
            });
        }

        Ok(Self(id))
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = InvalidConversationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ConversationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_carry_prefix_and_differ() {
        let first = ConversationId::new();
        let second = ConversationId::new();
        assert!(first.to_string().starts_with("conv_"));
        assert_ne!(first, second);
    }

    #[test]
    fn parse_accepts_generated_id() {
        let id = ConversationId::new();
        assert_eq!(ConversationId::parse(&id.to_string()), Ok(id));
    }

    #[test]
    fn parse_rejects_foreign_prefix() {
        let result = ConversationId::parse("tool_01h455vb4pex5vsknk084sn02q");
        assert!(matches!(
            result,
            Err(InvalidConversationId::WrongPrefix {
                expected: "conv",
                ..
            })
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        let result = "not-a-typeid".parse::<ConversationId>();
        assert!(matches!(result, Err(InvalidConversationId::Parse(_))));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ConversationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ConversationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
