//! `touchline status` — show configuration state.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use touchline_agent::tools::TeamRoster;
use touchline_core::config::{get_config_path, load_config};

use crate::helpers::expand_tilde;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "⚽ Touchline Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_mark(config_path.exists())
    );
    println!("  {:<18} {}", "Agent:".bold(), config.agent.name);
    println!(
        "  {:<18} {} | provider timeout: {}s | tool timeout: {}s",
        "Tool rounds:".bold(),
        config.agent.max_tool_rounds,
        config.agent.provider_timeout_secs,
        config.agent.tool_timeout_secs
    );

    // Provider
    println!();
    println!(
        "  {:<18} {} @ {} {}",
        "Provider:".bold(),
        config.provider.model,
        config.provider.api_base.dimmed(),
        configured_mark(config.provider.is_configured())
    );

    // Lookup
    let lookup = &config.lookup;
    let table = if lookup.is_configured() {
        format!("{}/{}", lookup.base_id, lookup.table)
    } else {
        "-".to_string()
    };
    println!(
        "  {:<18} {} {}",
        "Registrations:".bold(),
        table,
        configured_mark(lookup.is_configured())
    );

    // Roster
    let roster = match &config.teams.roster_path {
        Some(path) => match TeamRoster::from_json_file(&expand_tilde(path)) {
            Ok(roster) => format!("{} teams from {}", roster.len(), path),
            Err(e) => format!("{} {}", "✗".red(), e),
        },
        None => format!("{} teams (built-in)", TeamRoster::builtin().len()),
    };
    println!("  {:<18} {}", "Roster:".bold(), roster);

    // Server
    println!();
    let card_path = expand_tilde(&config.server.agent_card_path);
    println!(
        "  {:<18} {}:{}",
        "Server:".bold(),
        config.server.host,
        config.server.port
    );
    println!(
        "  {:<18} {} {}",
        "Agent card:".bold(),
        card_path.display(),
        found_mark(card_path.exists())
    );

    println!();
    Ok(())
}

fn found_mark(found: bool) -> String {
    if found {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

fn configured_mark(configured: bool) -> String {
    if configured {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}
