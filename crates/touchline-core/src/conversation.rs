//! Conversation state — the ordered, append-only turn log of one session.
//!
//! The caller owns the `Conversation` and lends it mutably to the orchestrator
//! for one cycle at a time. There is no way to remove or reorder turns.

use serde::{Deserialize, Serialize};

use crate::types::{Role, ToolCallRequest, ToolResult, Turn, TurnContent};

/// Ordered sequence of turns for a single session.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<TurnContent>) {
        self.turns.push(Turn::assistant(content));
    }

    pub fn push_tool(&mut self, call: ToolCallRequest, result: ToolResult) {
        self.turns.push(Turn::tool(call, result));
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role() == role).count()
    }
}
