use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::error::DeleteError;
use crate::models::{Artifact, ArtifactKind, DeletionPlan, DeletionResult};
use crate::parsers::remove_history_lines;
use crate::utils::ClaudeLayout;
use crate::utils::fs::{
    dir_size, file_size, is_real_dir, is_real_file, remove_dir_if_exists, remove_file_if_exists,
};

/// Every existing artifact of `session_id`, with sizes. Read-only.
///
/// Without a project there is no conversation path to check.
pub fn preview_deletion(
    layout: &ClaudeLayout,
    session_id: &str,
    project: Option<&str>,
) -> DeletionPlan {
    let mut artifacts = Vec::new();
    let mut push = |kind: ArtifactKind, path: PathBuf| {
        let exists = if kind.is_dir() { is_real_dir(&path) } else { is_real_file(&path) };
        if exists {
            let size = if kind.is_dir() { dir_size(&path) } else { file_size(&path) };
            artifacts.push(Artifact { kind, session_id: session_id.to_string(), path, size });
        }
    };

    if let Some(project) = project {
        push(ArtifactKind::Conversation, layout.conversation_path(session_id, project));
    }
    push(ArtifactKind::DebugLog, layout.debug_path(session_id));
    push(ArtifactKind::SessionEnv, layout.env_dir(session_id));
    push(ArtifactKind::FileHistory, layout.file_history_dir(session_id));
    for todo in layout.todo_files(session_id) {
        push(ArtifactKind::Todo, todo);
    }

    DeletionPlan { session_id: session_id.to_string(), project: project.map(str::to_string), artifacts }
}

/// Delete every artifact of one session and its history lines.
///
/// Refused with [`DeleteError::SessionLive`] when `session_id` is in `active`, and with
/// [`DeleteError::EmptySessionId`] for an empty id. Otherwise every step runs even if an
/// earlier one failed; failures end up in [`DeletionResult::errors`]. Running it again
/// on a cleaned session removes nothing and reports success.
pub fn delete_session(
    layout: &ClaudeLayout,
    session_id: &str,
    project: Option<&str>,
    active: &HashSet<String>,
) -> Result<DeletionResult, DeleteError> {
    if session_id.is_empty() {
        return Err(DeleteError::EmptySessionId);
    }
    if active.contains(session_id) {
        return Err(DeleteError::SessionLive { session_id: session_id.to_string() });
    }

    let mut result = DeletionResult { session_id: session_id.to_string(), ..Default::default() };

    if let Some(project) = project {
        let path = layout.conversation_path(session_id, project);
        let removed = remove_step(&mut result, ArtifactKind::Conversation, &path);
        result.conversation_file = removed;
    }
    let removed = remove_step(&mut result, ArtifactKind::DebugLog, &layout.debug_path(session_id));
    result.debug_file = removed;
    let removed = remove_step(&mut result, ArtifactKind::SessionEnv, &layout.env_dir(session_id));
    result.session_env = removed;
    let removed =
        remove_step(&mut result, ArtifactKind::FileHistory, &layout.file_history_dir(session_id));
    result.file_history = removed;

    for todo in layout.todo_files(session_id) {
        if remove_step(&mut result, ArtifactKind::Todo, &todo) {
            result.todos += 1;
        }
    }

    match remove_history_lines(&layout.history_file(), session_id) {
        Ok(removed) => result.history_entries = removed,
        Err(e) => {
            warn!(session_id, error = %e, "failed to rewrite history");
            result.errors.push(format!("history: {e:#}"));
        }
    }

    info!(
        session_id,
        freed = result.freed_bytes,
        history_entries = result.history_entries,
        errors = result.errors.len(),
        "deleted session"
    );
    Ok(result)
}

/// Remove one artifact, adding its size to the freed total. Returns whether it was removed.
fn remove_step(result: &mut DeletionResult, kind: ArtifactKind, path: &Path) -> bool {
    let size = if kind.is_dir() { dir_size(path) } else { file_size(path) };
    let removed: Result<bool> =
        if kind.is_dir() { remove_dir_if_exists(path) } else { remove_file_if_exists(path) };

    match removed {
        Ok(true) => {
            result.freed_bytes += size;
            true
        }
        Ok(false) => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove {kind}");
            result.errors.push(format!("{kind}: {e:#}"));
            false
        }
    }
}
