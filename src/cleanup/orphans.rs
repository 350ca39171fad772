//! Orphan reconciliation.
//!
//! An artifact is an orphan when the session id derived from its name never appears in
//! the history index. Ids come from:
//!
//! - debug logs and conversation files: the file stem;
//! - session-env and file-history entries: the directory name;
//! - todo files: the stem up to its first `-`.
//!
//! The todo rule assumes ids without dashes. With dashed ids (UUIDs) the first segment
//! never matches and every todo file is treated as an orphan.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::indexer::discover_projects;
use crate::models::{Artifact, ArtifactKind, OrphanPlan, SweepResult};
use crate::utils::fs::{dir_size, file_size, is_empty_dir, remove_dir_if_exists, remove_file_if_exists};
use crate::utils::paths::{DEBUG_EXTENSION, TODO_EXTENSION, file_stem_string, has_extension};
use crate::utils::{ClaudeLayout, format_size};

/// Every artifact whose id is not in `valid_ids`. Read-only.
///
/// `valid_ids` should hold every id ever seen in the history, superseded records
/// included. With an empty set everything is an orphan.
pub fn preview_orphans(layout: &ClaudeLayout, valid_ids: &HashSet<String>) -> OrphanPlan {
    let mut plan = OrphanPlan::default();
    let is_orphan = |id: &str| !valid_ids.contains(id);

    scan_store(&mut plan, &layout.debug_dir(), |_, path, file_type| {
        if !file_type.is_file() || !has_extension(path, DEBUG_EXTENSION) {
            return None;
        }
        let id = file_stem_string(path)?;
        is_orphan(&id).then_some((ArtifactKind::DebugLog, id))
    });

    match discover_projects(layout) {
        Ok(projects) => {
            for project in projects {
                let mut orphaned = Vec::new();
                for path in project.conversation_files {
                    if let Some(id) = file_stem_string(&path)
                        && is_orphan(&id)
                    {
                        let size = file_size(&path);
                        orphaned.push(Artifact {
                            kind: ArtifactKind::Conversation,
                            session_id: id,
                            path,
                            size,
                        });
                    }
                }
                if empty_after_removing(&project.project_dir, &orphaned) {
                    plan.empty_project_dirs.push(project.project_dir);
                }
                plan.artifacts.extend(orphaned);
            }
        }
        Err(e) => plan.scan_errors.push(format!("{e:#}")),
    }

    for (root, kind) in [
        (layout.session_env_root(), ArtifactKind::SessionEnv),
        (layout.file_history_root(), ArtifactKind::FileHistory),
    ] {
        scan_store(&mut plan, &root, |name, _, file_type| {
            (file_type.is_dir() && is_orphan(name)).then(|| (kind, name.to_string()))
        });
    }

    scan_store(&mut plan, &layout.todos_dir(), |_, path, file_type| {
        if !file_type.is_file() || !has_extension(path, TODO_EXTENSION) {
            return None;
        }
        let stem = file_stem_string(path)?;
        let (id, _) = stem.split_once('-')?;
        is_orphan(id).then(|| (ArtifactKind::Todo, id.to_string()))
    });

    debug!(orphans = plan.artifacts.len(), bytes = plan.total_size(), "scanned for orphans");
    plan
}

/// Remove every orphan, then any project directory left empty.
///
/// Continues past individual failures (collected in `failures`) and past stores that
/// could not be read (collected in `error`). Counts reflect what was actually removed.
pub fn sweep(layout: &ClaudeLayout, valid_ids: &HashSet<String>) -> SweepResult {
    let plan = preview_orphans(layout, valid_ids);
    let mut result = SweepResult::default();
    for message in plan.scan_errors {
        result.push_error(message);
    }

    for artifact in plan.artifacts {
        let removed = if artifact.kind.is_dir() {
            remove_dir_if_exists(&artifact.path)
        } else {
            remove_file_if_exists(&artifact.path)
        };

        match removed {
            Ok(true) => {
                result.record(artifact.kind);
                result.total_size_freed += artifact.size;
                result.details.push(format!(
                    "{}: {}... ({})",
                    artifact.kind,
                    short_id(&artifact.session_id),
                    format_size(artifact.size)
                ));
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = %artifact.path.display(), error = %e, "failed to remove orphan");
                result.failures.push(format!("{}: {e:#}", artifact.kind));
            }
        }
    }

    remove_empty_project_dirs(layout, &mut result);

    info!(
        removed = result.removed(),
        freed = result.total_size_freed,
        empty_project_dirs = result.empty_project_dirs,
        failures = result.failures.len(),
        "orphan sweep finished"
    );
    result
}

/// Read one store directory and collect the entries `classify` maps to an orphan id.
///
/// A missing store is skipped silently; an unreadable one is recorded in `scan_errors`.
fn scan_store<F>(plan: &mut OrphanPlan, dir: &Path, mut classify: F)
where
    F: FnMut(&str, &Path, fs::FileType) -> Option<(ArtifactKind, String)>,
{
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to read store");
            plan.scan_errors.push(format!("Failed to read {}: {e}", dir.display()));
            return;
        }
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some((kind, session_id)) = classify(&name, &path, file_type) {
            let size = if kind.is_dir() { dir_size(&path) } else { file_size(&path) };
            plan.artifacts.push(Artifact { kind, session_id, path, size });
        }
    }
}

/// True when every entry of `dir` is one of `removed`, including when it has none.
fn empty_after_removing(dir: &Path, removed: &[Artifact]) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .all(|entry| removed.iter().any(|artifact| artifact.path == entry.path()))
}

fn remove_empty_project_dirs(layout: &ClaudeLayout, result: &mut SweepResult) {
    // An unreadable projects directory was already reported by the scan
    let Ok(projects) = discover_projects(layout) else {
        return;
    };

    for project in projects {
        if !is_empty_dir(&project.project_dir) {
            continue;
        }
        match fs::remove_dir(&project.project_dir) {
            Ok(()) => {
                result.empty_project_dirs += 1;
                result.details.push(format!("empty project directory: {}", project.encoded_name));
            }
            Err(e) => {
                warn!(path = %project.project_dir.display(), error = %e, "failed to remove empty project");
                result.failures.push(format!("project {}: {e}", project.encoded_name));
            }
        }
    }
}

fn short_id(session_id: &str) -> &str {
    match session_id.char_indices().nth(8) {
        Some((end, _)) => &session_id[..end],
        None => session_id,
    }
}
