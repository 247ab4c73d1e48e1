//! Interactive session — one conversation driven line by line.

use std::sync::Arc;

use tracing::debug;

use touchline_core::Conversation;

use crate::orchestrator::{FinalAnswer, Orchestrator};

/// Inputs that end the session (case-insensitive, whitespace ignored).
const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

/// What happened to one line of input.
#[derive(Clone, Debug, PartialEq)]
pub enum LineOutcome {
    /// The user asked to leave; nothing was recorded.
    Quit,
    /// Blank line; nothing was recorded.
    Skip,
    Answered(FinalAnswer),
}

/// Owns the conversation for one interactive user.
pub struct InteractiveSession {
    orchestrator: Arc<Orchestrator>,
    conversation: Conversation,
}

impl InteractiveSession {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            conversation: Conversation::new(),
        }
    }

    /// Handle one line of user input.
    pub async fn handle_line(&mut self, line: &str) -> LineOutcome {
        let trimmed = line.trim();
        // Blank input is not a question; it never becomes a user turn.
        if trimmed.is_empty() {
            return LineOutcome::Skip;
        }
        if is_exit_command(trimmed) {
            return LineOutcome::Quit;
        }

        debug!(turns = self.conversation.len(), "running session turn");
        let answer = self.orchestrator.run_turn(&mut self.conversation, trimmed).await;
        LineOutcome::Answered(answer)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

/// Check if input is an exit command.
pub fn is_exit_command(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}
