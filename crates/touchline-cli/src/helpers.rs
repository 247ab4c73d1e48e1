//! Shared CLI helpers — path expansion, answer printing, banner.

use std::path::PathBuf;

use colored::Colorize;
use serde_json::Value;

use touchline_agent::FinalAnswer;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an orchestrator answer to stdout.
pub fn print_response(agent_name: &str, answer: &FinalAnswer) {
    println!();
    println!("{}", format!("⚽ {agent_name}").cyan().bold());
    match answer {
        FinalAnswer::Text(text) => println!("{text}"),
        FinalAnswer::Structured(value) => print_json(value),
        FinalAnswer::NoResponse => println!("{}", answer.to_string().dimmed()),
        FinalAnswer::Failed(_) => println!("{}", answer.to_string().red()),
    }
    println!();
}

/// Pretty-print a JSON value.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{pretty}"),
        Err(_) => println!("{value}"),
    }
}

/// Print the banner shown at REPL start.
pub fn print_banner(agent_name: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}",
        format!("⚽ {agent_name}").cyan().bold(),
        version.dimmed()
    );
    println!(
        "{}",
        "Ask about team spaces or registration codes, or \"quit\" to leave.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
