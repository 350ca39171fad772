use std::path::PathBuf;

use anyhow::Result;

use crate::utils::{ClaudeLayout, resolve_claude_dir};

/// Runtime settings resolved from flags, environment and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub claude_dir: PathBuf,
    pub active_window_minutes: u64,
}

impl Settings {
    /// An explicit directory (flag or `CLAUDE_CONFIG_DIR`) wins over `~/.claude`.
    /// Blank overrides count as unset.
    pub fn resolve(claude_dir: Option<PathBuf>, active_window_minutes: u64) -> Result<Self> {
        let explicit = claude_dir.filter(|dir| !dir.as_os_str().to_string_lossy().trim().is_empty());
        Ok(Self { claude_dir: resolve_claude_dir(explicit)?, active_window_minutes })
    }

    pub fn layout(&self) -> ClaudeLayout {
        ClaudeLayout::new(&self.claude_dir)
    }
}
