//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `LookupConfig`,
//! `TeamsConfig`, `ServerConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

/// Default system instructions for the club orchestrator.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are the front-door assistant for Urmston Town Juniors Football Club, \
a grassroots football club based in Urmston, Manchester, England.\n\n\
- When someone asks whether a team has spaces, vacancies or room for a new player, \
call `check_team_availability` with the exact team name (for example \"U10 Tigers\").\n\
- When someone gives you a registration code, call `validate_registration_code` \
with the code.\n\
- If a tool returns an error, apologise briefly and explain what went wrong in plain words.\n\
- Otherwise answer politely and concisely. If you cannot help, say you will pass the \
query on to a club volunteer.";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.touchline/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub lookup: LookupConfig,
    pub teams: TeamsConfig,
    pub server: ServerConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Orchestrator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Display name of the agent.
    pub name: String,
    /// System instructions sent to the completion provider.
    pub instructions: String,
    /// Maximum tool-call rounds per user turn before finalization is forced.
    pub max_tool_rounds: u32,
    /// Seconds to wait for one provider decision.
    pub provider_timeout_secs: u64,
    /// Seconds to wait for one tool invocation.
    pub tool_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Urmston Town Orchestrator".to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            max_tool_rounds: 4,
            provider_timeout_secs: 60,
            tool_timeout_secs: 30,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Completion provider connection (any OpenAI-compatible API).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for Bearer authentication.
    pub api_key: String,
    /// API base URL.
    pub api_base: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl ProviderConfig {
    /// Whether an API key has been provided.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }
}

// ─────────────────────────────────────────────
// Lookup service (registration codes)
// ─────────────────────────────────────────────

/// Registration records store (Airtable).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupConfig {
    pub api_key: String,
    pub api_base: String,
    pub base_id: String,
    /// Table name or id.
    pub table: String,
    /// Field holding the registration code.
    pub code_field: String,
    pub timeout_secs: u64,
}

impl LookupConfig {
    /// Whether enough is set to reach the store.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_id.is_empty() && !self.table.is_empty()
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.airtable.com/v0".to_string(),
            base_id: String::new(),
            table: String::new(),
            code_field: "registration_code".to_string(),
            timeout_secs: 10,
        }
    }
}

// ─────────────────────────────────────────────
// Teams
// ─────────────────────────────────────────────

/// Team roster source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamsConfig {
    /// JSON file with the roster; the built-in roster is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster_path: Option<String>,
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// Discovery / skill HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path to the static agent card served at `/.well-known/agent.json`.
    pub agent_card_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            agent_card_path: "agent.json".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.max_tool_rounds, 4);
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.server.port, 8000);
        assert!(!config.provider.is_configured());
        assert!(!config.lookup.is_configured());
        assert!(config.teams.roster_path.is_none());
    }

    #[test]
    fn test_camel_case_round_trip() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["agent"].get("maxToolRounds").is_some());
        assert!(json["lookup"].get("codeField").is_some());
        assert!(json["server"].get("agentCardPath").is_some());
        // Unset roster path is omitted.
        assert!(json["teams"].get("rosterPath").is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"agent": {"maxToolRounds": 2}}"#).unwrap();
        assert_eq!(config.agent.max_tool_rounds, 2);
        assert_eq!(config.agent.provider_timeout_secs, 60);
        assert_eq!(config.agent.name, "Urmston Town Orchestrator");
    }

    #[test]
    fn test_lookup_configured_needs_all_parts() {
        let mut lookup = LookupConfig {
            api_key: "key".into(),
            ..Default::default()
        };
        assert!(!lookup.is_configured());
        lookup.base_id = "appXYZ".into();
        lookup.table = "Registrations".into();
        assert!(lookup.is_configured());
    }
}
