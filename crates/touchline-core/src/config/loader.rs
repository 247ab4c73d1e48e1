//! Config loader — reads `~/.touchline/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.touchline/config.json`
//! 3. Environment variables `TOUCHLINE_<SECTION>__<FIELD>` (override JSON)
//! 4. Conventional credential variables (`OPENAI_API_KEY`, `AIRTABLE_*`),
//!    only where the fields are still empty

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `TOUCHLINE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `TOUCHLINE_AGENT__MAX_TOOL_ROUNDS`, `..._PROVIDER_TIMEOUT_SECS`, `..._TOOL_TIMEOUT_SECS`
/// - `TOUCHLINE_PROVIDER__API_KEY`, `..._API_BASE`, `..._MODEL`
/// - `TOUCHLINE_LOOKUP__API_KEY`, `..._BASE_ID`, `..._TABLE`
/// - `TOUCHLINE_TEAMS__ROSTER_PATH`
/// - `TOUCHLINE_SERVER__HOST`, `..._PORT`, `..._AGENT_CARD_PATH`
fn apply_env_overrides(mut config: Config) -> Config {
    // Agent
    if let Some(n) = env_parse::<u32>("TOUCHLINE_AGENT__MAX_TOOL_ROUNDS") {
        config.agent.max_tool_rounds = n;
    }
    if let Some(n) = env_parse::<u64>("TOUCHLINE_AGENT__PROVIDER_TIMEOUT_SECS") {
        config.agent.provider_timeout_secs = n;
    }
    if let Some(n) = env_parse::<u64>("TOUCHLINE_AGENT__TOOL_TIMEOUT_SECS") {
        config.agent.tool_timeout_secs = n;
    }

    // Provider
    if let Ok(val) = std::env::var("TOUCHLINE_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("TOUCHLINE_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Ok(val) = std::env::var("TOUCHLINE_PROVIDER__MODEL") {
        config.provider.model = val;
    }

    // Lookup
    if let Ok(val) = std::env::var("TOUCHLINE_LOOKUP__API_KEY") {
        config.lookup.api_key = val;
    }
    if let Ok(val) = std::env::var("TOUCHLINE_LOOKUP__BASE_ID") {
        config.lookup.base_id = val;
    }
    if let Ok(val) = std::env::var("TOUCHLINE_LOOKUP__TABLE") {
        config.lookup.table = val;
    }

    // Teams
    if let Ok(val) = std::env::var("TOUCHLINE_TEAMS__ROSTER_PATH") {
        config.teams.roster_path = Some(val);
    }

    // Server
    if let Ok(val) = std::env::var("TOUCHLINE_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(p) = env_parse::<u16>("TOUCHLINE_SERVER__PORT") {
        config.server.port = p;
    }
    if let Ok(val) = std::env::var("TOUCHLINE_SERVER__AGENT_CARD_PATH") {
        config.server.agent_card_path = val;
    }

    // Conventional credentials fill whatever is still empty.
    fill_from_env(&mut config.provider.api_key, "OPENAI_API_KEY");
    fill_from_env(&mut config.lookup.api_key, "AIRTABLE_API_KEY");
    fill_from_env(&mut config.lookup.base_id, "AIRTABLE_BASE_ID");
    fill_from_env(&mut config.lookup.table, "AIRTABLE_TABLE_ID");

    config
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let val = std::env::var(key).ok()?;
    match val.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {key}: cannot parse {val:?}");
            None
        }
    }
}

fn fill_from_env(field: &mut String, key: &str) {
    if field.is_empty() {
        if let Ok(val) = std::env::var(key) {
            *field = val;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = read_config_file(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.agent.max_tool_rounds, 4);
        assert_eq!(config.provider.model, "gpt-4o");
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "agent": { "maxToolRounds": 3, "providerTimeoutSecs": 15 },
            "provider": { "model": "gpt-4o-mini" }
        }"#,
        );

        let config = read_config_file(file.path());
        assert_eq!(config.agent.max_tool_rounds, 3);
        assert_eq!(config.agent.provider_timeout_secs, 15);
        assert_eq!(config.provider.model, "gpt-4o-mini");
        // Default preserved
        assert_eq!(config.provider.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = read_config_file(file.path());
        assert_eq!(config.agent.max_tool_rounds, 4);
    }

    #[test]
    fn test_load_empty_json() {
        let file = write_temp_json("{}");
        let config = read_config_file(file.path());
        assert_eq!(config.lookup.api_base, "https://api.airtable.com/v0");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.provider.model = "gpt-4.1".to_string();
        config.teams.roster_path = Some("/srv/club/teams.json".to_string());

        save_config(&config, Some(&path)).unwrap();

        let reloaded = read_config_file(&path);
        assert_eq!(reloaded.provider.model, "gpt-4.1");
        assert_eq!(reloaded.teams.roster_path.as_deref(), Some("/srv/club/teams.json"));
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["agent"].get("maxToolRounds").is_some());
        assert!(raw["agent"].get("max_tool_rounds").is_none());
    }

    #[test]
    fn test_env_override_server_port() {
        std::env::set_var("TOUCHLINE_SERVER__PORT", "9999");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.server.port, 9999);
        std::env::remove_var("TOUCHLINE_SERVER__PORT");
    }

    #[test]
    fn test_env_override_unparseable_ignored() {
        std::env::set_var("TOUCHLINE_AGENT__TOOL_TIMEOUT_SECS", "soon");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.agent.tool_timeout_secs, 30);
        std::env::remove_var("TOUCHLINE_AGENT__TOOL_TIMEOUT_SECS");
    }

    #[test]
    fn test_conventional_env_does_not_replace_configured_value() {
        std::env::set_var("AIRTABLE_BASE_ID", "appFromEnv");
        let mut config = Config::default();
        config.lookup.base_id = "appFromFile".to_string();
        let config = apply_env_overrides(config);
        assert_eq!(config.lookup.base_id, "appFromFile");
        std::env::remove_var("AIRTABLE_BASE_ID");
    }

    #[test]
    fn test_full_load_applies_env() {
        let file = write_temp_json(r#"{ "lookup": { "table": "FromFile" } }"#);
        std::env::set_var("TOUCHLINE_LOOKUP__TABLE", "FromEnv");
        let config = load_config(Some(file.path()));
        assert_eq!(config.lookup.table, "FromEnv");
        std::env::remove_var("TOUCHLINE_LOOKUP__TABLE");
    }
}
