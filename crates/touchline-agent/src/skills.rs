//! Published skills — single-shot entry points other agents can call.
//!
//! Each skill runs one orchestrator cycle on a fresh conversation and always
//! returns a JSON object, never an error.

use serde_json::{json, Value};
use tracing::info;

use touchline_core::Conversation;

use crate::orchestrator::{FinalAnswer, Orchestrator};

/// Name under which [`check_team_spaces`] is published.
pub const CHECK_TEAM_SPACES: &str = "check_team_spaces";

/// Ask the orchestrator whether `team_name` has spaces.
///
/// Structured answers are returned verbatim; free text is wrapped as
/// `{"response_text": ...}`; anything else becomes `{"error", "details"}`.
pub async fn check_team_spaces(orchestrator: &Orchestrator, team_name: &str) -> Value {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        return json!({
            "error": "Invalid skill input",
            "details": "team_name must be a non-empty string",
        });
    }

    info!(skill = CHECK_TEAM_SPACES, team = %team_name, "skill invoked");

    let mut conversation = Conversation::new();
    let prompt = format!("Do you have spaces on the {team_name} team?");

    match orchestrator.run_structured_turn(&mut conversation, &prompt).await {
        FinalAnswer::Structured(value) => value,
        FinalAnswer::Text(text) => json!({ "response_text": text }),
        FinalAnswer::NoResponse => json!({
            "error": "No response generated by orchestrator agent",
            "details": format!("the orchestrator returned no answer for team '{team_name}'"),
        }),
        FinalAnswer::Failed(e) => json!({
            "error": "Failed to process request via orchestrator agent",
            "details": e.to_string(),
        }),
    }
}
