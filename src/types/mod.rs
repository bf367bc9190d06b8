//! Identity types shared across the workflow.

mod conversation_id;

pub use conversation_id::{ConversationId, InvalidConversationId};
