//! Touchline core — shared data model, conversation state, and configuration.
//!
//! - **types**: turns, tool calls, tool results, provider-facing tool definitions
//! - **conversation**: the append-only turn log owned by one session
//! - **config**: schema + loader (`~/.touchline/config.json` and env overrides)

pub mod config;
pub mod conversation;
pub mod types;
pub mod utils;

pub use conversation::Conversation;
pub use types::{Role, ToolCallRequest, ToolDefinition, ToolResult, Turn, TurnContent};
