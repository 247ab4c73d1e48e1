//! Touchline agent — orchestrator loop, tools, and the session shim.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and the club lookup tools
//! - **orchestrator**: the provider ↔ tool decision loop
//! - **session**: line-by-line interactive sessions
//! - **skills**: single-shot skills published over HTTP

pub mod error;
pub mod orchestrator;
pub mod session;
pub mod skills;
pub mod tools;

pub use error::{OrchestratorError, TurnError};
pub use orchestrator::{AgentProfile, FinalAnswer, Orchestrator, OrchestratorConfig};
pub use session::{InteractiveSession, LineOutcome};
pub use skills::check_team_spaces;
pub use tools::{Tool, ToolRegistry};
