use std::fs;

use anyhow::{Context, Result};
use tracing::warn;

use crate::models::ProjectInfo;
use crate::utils::ClaudeLayout;
use crate::utils::paths::{CONVERSATION_EXTENSION, has_extension};

/// Discover all project directories under `projects/` and their `*.jsonl` files
///
/// Only files directly inside a project directory count; subdirectories are not
/// descended into. Symlinked project directories and symlinked files are skipped so a
/// sweep can never reach outside the data directory.
///
/// # Returns
///
/// Projects sorted by directory name, each with its conversation files sorted by path.
/// Returns an empty Vec if the projects directory doesn't exist (not an error).
///
/// # Errors
///
/// Returns an error if the projects directory exists but cannot be read. A project
/// directory that cannot be read is logged and skipped.
pub fn discover_projects(layout: &ClaudeLayout) -> Result<Vec<ProjectInfo>> {
    let projects_dir = layout.projects_dir();
    if !projects_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&projects_dir)
        .with_context(|| format!("Failed to read projects directory: {}", projects_dir.display()))?;

    let mut projects = Vec::new();
    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            warn!(path = %entry.path().display(), "skipping symlinked project directory");
            continue;
        }
        if !file_type.is_dir() {
            continue;
        }

        let project_dir = entry.path();
        let encoded_name = entry.file_name().to_string_lossy().into_owned();

        let files = match fs::read_dir(&project_dir) {
            Ok(files) => files,
            Err(e) => {
                warn!(path = %project_dir.display(), error = %e, "failed to read project directory");
                continue;
            }
        };

        let mut conversation_files: Vec<_> = files
            .flatten()
            .filter(|file| file.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|file| file.path())
            .filter(|path| has_extension(path, CONVERSATION_EXTENSION))
            .collect();
        conversation_files.sort();

        projects.push(ProjectInfo { encoded_name, project_dir, conversation_files });
    }

    projects.sort_by(|a, b| a.encoded_name.cmp(&b.encoded_name));
    Ok(projects)
}
