//! `touchline init` — write the default config and agent card.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use touchline_core::config::{get_config_path, save_config, Config};
use touchline_core::utils::{get_data_path, get_history_path};

use crate::server::DEFAULT_AGENT_CARD;

/// Run the init command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "⚽ Touchline — Setup".cyan().bold());
    println!();

    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);
    let data_dir = get_data_path();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    // 1. Agent card
    let card_path = data_dir.join("agent.json");
    create_if_missing(&card_path, DEFAULT_AGENT_CARD)?;

    // 2. Config, pointing at the card just written
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        let mut config = Config::default();
        config.server.agent_card_path = card_path.display().to_string();
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    // 3. REPL history directory
    std::fs::create_dir_all(get_history_path())?;

    println!();
    println!(
        "{}",
        "  Setup complete! Set OPENAI_API_KEY (and AIRTABLE_* for registration codes), then run `touchline chat`."
            .green()
    );
    println!();

    Ok(())
}

/// Write a file unless it already exists.
fn create_if_missing(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_if_missing_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");

        create_if_missing(&path, "{\"name\": \"first\"}").unwrap();
        create_if_missing(&path, "{\"name\": \"second\"}").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("first"));
    }
}
