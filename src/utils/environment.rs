use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable that relocates the Claude data directory.
pub const CLAUDE_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Get the default Claude directory path (~/.claude)
pub fn get_claude_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(".claude"))
}

/// Pick the Claude directory: an explicit override wins, otherwise ~/.claude.
pub fn resolve_claude_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => get_claude_dir(),
    }
}
