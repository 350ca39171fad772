//! The engine instance behind every command.
//!
//! `SessionManager` owns the loaded history and the cached active-session set. Nothing
//! is recomputed implicitly: call [`SessionManager::reload`] or
//! [`SessionManager::refresh_active_sessions`] when the disk may have changed.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use crate::cleanup;
use crate::config::Settings;
use crate::error::DeleteError;
use crate::indexer::{LivenessDetector, dedupe_sessions, discover_projects, unique_sessions};
use crate::models::{
    ConversationMessage, DeletionPlan, DeletionResult, OrphanPlan, RankedSession, SessionRecord,
    StorageStats, SweepResult,
};
use crate::parsers::{history_session_ids, load_conversation_file, load_history_file, session_title};
use crate::utils::ClaudeLayout;
use crate::utils::fs::file_size;
use crate::utils::paths::{DEBUG_EXTENSION, has_extension};

pub struct SessionManager {
    layout: ClaudeLayout,
    sessions: Vec<SessionRecord>,
    liveness: LivenessDetector,
}

impl SessionManager {
    /// A manager over `root` with nothing loaded yet.
    pub fn new(root: impl Into<PathBuf>, active_window_minutes: u64) -> Self {
        Self {
            layout: ClaudeLayout::new(root),
            sessions: Vec::new(),
            liveness: LivenessDetector::new(active_window_minutes),
        }
    }

    /// Build from settings and load history plus the active set.
    pub fn open(settings: &Settings) -> Result<Self> {
        let mut manager = Self::new(&settings.claude_dir, settings.active_window_minutes);
        manager.reload()?;
        Ok(manager)
    }

    pub fn layout(&self) -> &ClaudeLayout {
        &self.layout
    }

    /// Re-read history.jsonl. Returns the number of records.
    pub fn load_sessions(&mut self) -> Result<usize> {
        self.sessions = load_history_file(&self.layout.history_file())?;
        debug!(records = self.sessions.len(), "loaded history");
        Ok(self.sessions.len())
    }

    /// Re-read the history and recompute the active set.
    pub fn reload(&mut self) -> Result<()> {
        self.load_sessions()?;
        self.liveness.refresh(&self.layout);
        Ok(())
    }

    /// Recompute the active set, optionally with a new window.
    pub fn refresh_active_sessions(&mut self, window_minutes: Option<u64>) -> &HashSet<String> {
        if let Some(minutes) = window_minutes {
            self.liveness.set_window_minutes(minutes);
        }
        self.liveness.refresh(&self.layout)
    }

    /// The cached active set from the last refresh.
    pub fn active_sessions(&self) -> &HashSet<String> {
        self.liveness.active_ids()
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.liveness.is_active(session_id)
    }

    /// Raw history records in file order.
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Every id mentioned in the history, superseded records included.
    pub fn all_session_ids(&self) -> HashSet<String> {
        history_session_ids(&self.sessions)
    }

    /// One record per id, most recent first, before display ranking.
    pub fn deduplicated_sessions(&self) -> Vec<SessionRecord> {
        dedupe_sessions(&self.sessions)
    }

    /// One record per id in display order.
    pub fn unique_sessions(&self) -> Vec<RankedSession> {
        unique_sessions(&self.sessions, &self.layout)
    }

    /// Latest record for `session_id`, if the history mentions it.
    pub fn find_session(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions
            .iter()
            .filter(|record| record.session_id.as_deref() == Some(session_id))
            .max_by_key(|record| record.timestamp)
            .cloned()
    }

    pub fn conversation_file(&self, session_id: &str, project: &str) -> PathBuf {
        self.layout.conversation_path(session_id, project)
    }

    pub fn conversation_file_size(&self, session_id: &str, project: &str) -> u64 {
        file_size(&self.conversation_file(session_id, project))
    }

    pub fn load_conversation(
        &self,
        session_id: &str,
        project: &str,
    ) -> Result<Vec<ConversationMessage>> {
        load_conversation_file(&self.conversation_file(session_id, project))
    }

    /// Custom title, else the first user message, else `None`. Unreadable files count as
    /// untitled.
    pub fn session_title(&self, session_id: &str, project: &str) -> Option<String> {
        let path = self.conversation_file(session_id, project);
        match session_title(&path) {
            Ok(title) => title,
            Err(e) => {
                warn!(session_id, error = %e, "failed to read session title");
                None
            }
        }
    }

    pub fn preview_deletion(&self, session_id: &str, project: Option<&str>) -> DeletionPlan {
        cleanup::preview_deletion(&self.layout, session_id, project)
    }

    /// Delete one session the loaded history knows about, unless it is in the cached
    /// active set.
    ///
    /// The in-memory history is reloaded afterwards so later listings agree with disk.
    pub fn delete_session(
        &mut self,
        session_id: &str,
        project: Option<&str>,
    ) -> Result<DeletionResult, DeleteError> {
        self.ensure_known(session_id)?;
        let result =
            cleanup::delete_session(&self.layout, session_id, project, self.liveness.active_ids())?;
        self.reload_after_mutation();
        Ok(result)
    }

    /// Delete several sessions, each with its latest project. Live and unknown sessions
    /// are refused individually while the rest proceed.
    pub fn delete_sessions(
        &mut self,
        session_ids: &[String],
    ) -> Vec<(String, Result<DeletionResult, DeleteError>)> {
        let targets: Vec<(String, Option<String>)> = session_ids
            .iter()
            .map(|id| (id.clone(), self.find_session(id).and_then(|record| record.project)))
            .collect();

        let outcomes = targets
            .into_iter()
            .map(|(id, project)| {
                let outcome = self.ensure_known(&id).and_then(|()| {
                    cleanup::delete_session(
                        &self.layout,
                        &id,
                        project.as_deref(),
                        self.liveness.active_ids(),
                    )
                });
                (id, outcome)
            })
            .collect();

        self.reload_after_mutation();
        outcomes
    }

    /// Orphans against every id the loaded history has ever mentioned.
    pub fn preview_orphans(&self) -> OrphanPlan {
        cleanup::preview_orphans(&self.layout, &self.all_session_ids())
    }

    pub fn cleanup_orphaned_files(&self) -> SweepResult {
        cleanup::sweep(&self.layout, &self.all_session_ids())
    }

    pub fn stats(&self) -> StorageStats {
        let unique = self.unique_sessions();
        let mut stats = StorageStats {
            history_records: self.sessions.len(),
            unique_sessions: unique.len(),
            history_bytes: file_size(&self.layout.history_file()),
            ..Default::default()
        };

        for session in unique.iter().filter(|s| s.has_file) {
            stats.conversation_files += 1;
            stats.conversation_bytes += session.conversation_size;
        }

        if let Ok(entries) = std::fs::read_dir(self.layout.debug_dir()) {
            for path in entries.flatten().map(|entry| entry.path()) {
                if has_extension(&path, DEBUG_EXTENSION) && path.is_file() {
                    stats.debug_files += 1;
                    stats.debug_bytes += file_size(&path);
                }
            }
        }

        stats
    }

    /// Number of project directories currently on disk.
    pub fn project_count(&self) -> usize {
        discover_projects(&self.layout).map(|projects| projects.len()).unwrap_or(0)
    }

    /// Empty ids are left to the deletion planner, which refuses them on its own.
    fn ensure_known(&self, session_id: &str) -> Result<(), DeleteError> {
        let known = self.sessions.iter().any(|r| r.session_id.as_deref() == Some(session_id));
        if session_id.is_empty() || known {
            Ok(())
        } else {
            Err(DeleteError::UnknownSession { session_id: session_id.to_string() })
        }
    }

    fn reload_after_mutation(&mut self) {
        if let Err(e) = self.load_sessions() {
            warn!(error = %e, "failed to reload history after delete");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_history(root: &std::path::Path, lines: &[&str]) {
        fs::write(root.join("history.jsonl"), lines.join("\n") + "\n").unwrap();
    }

    #[test]
    fn test_empty_directory() {
        let root = TempDir::new().unwrap();
        let mut manager = SessionManager::new(root.path(), 10);
        manager.reload().unwrap();

        assert!(manager.all_session_ids().is_empty());
        assert!(manager.unique_sessions().is_empty());
        assert!(manager.active_sessions().is_empty());
        assert_eq!(manager.stats(), StorageStats::default());
    }

    #[test]
    fn test_find_session_returns_latest_record() {
        let root = TempDir::new().unwrap();
        write_history(
            root.path(),
            &[
                r#"{"sessionId":"s1","project":"/old","display":"a","timestamp":1}"#,
                r#"{"sessionId":"s1","project":"/new","display":"b","timestamp":5}"#,
                r#"{"sessionId":"s2","project":"/x","display":"c","timestamp":3}"#,
            ],
        );
        let mut manager = SessionManager::new(root.path(), 10);
        manager.reload().unwrap();

        let record = manager.find_session("s1").unwrap();
        assert_eq!(record.project.as_deref(), Some("/new"));
        assert!(manager.find_session("missing").is_none());
        assert_eq!(manager.all_session_ids().len(), 2);
        assert_eq!(manager.deduplicated_sessions()[0].session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_delete_session_reloads_history() {
        let root = TempDir::new().unwrap();
        write_history(
            root.path(),
            &[
                r#"{"sessionId":"s1","project":"/p","display":"a","timestamp":1}"#,
                r#"{"sessionId":"s2","project":"/p","display":"b","timestamp":2}"#,
            ],
        );
        let mut manager = SessionManager::new(root.path(), 10);
        manager.reload().unwrap();

        let result = manager.delete_session("s1", Some("/p")).unwrap();
        assert_eq!(result.history_entries, 1);
        assert_eq!(manager.sessions().len(), 1);
        assert!(!manager.all_session_ids().contains("s1"));
    }

    #[test]
    fn test_batch_delete_skips_live_sessions() {
        let root = TempDir::new().unwrap();
        write_history(
            root.path(),
            &[
                r#"{"sessionId":"live","project":"/p","display":"a","timestamp":1}"#,
                r#"{"sessionId":"idle","project":"/p","display":"b","timestamp":2}"#,
            ],
        );
        let layout = ClaudeLayout::new(root.path());
        fs::create_dir_all(layout.debug_dir()).unwrap();
        fs::write(layout.debug_path("live"), "running").unwrap();

        let mut manager = SessionManager::new(root.path(), 10);
        manager.reload().unwrap();
        assert!(manager.is_active("live"));

        let outcomes = manager.delete_sessions(&["live".to_string(), "idle".to_string()]);
        assert!(matches!(outcomes[0].1, Err(DeleteError::SessionLive { .. })));
        assert!(outcomes[1].1.as_ref().unwrap().success());
        assert!(layout.debug_path("live").exists());
        assert_eq!(manager.all_session_ids(), HashSet::from(["live".to_string()]));
    }

    #[test]
    fn test_delete_refuses_ids_missing_from_history() {
        let root = TempDir::new().unwrap();
        write_history(
            root.path(),
            &[
                r#"{"sessionId":"s1","project":"/p","display":"a","timestamp":1}"#,
                r#"{"sessionId":"s2","project":"/p","display":"b","timestamp":2}"#,
            ],
        );
        let history_before = fs::read_to_string(root.path().join("history.jsonl")).unwrap();
        let mut manager = SessionManager::new(root.path(), 10);
        manager.reload().unwrap();

        // "session" is a substring of the sessionId key on every line
        let err = manager.delete_session("session", None).unwrap_err();
        assert_eq!(err, DeleteError::UnknownSession { session_id: "session".to_string() });

        let outcomes = manager.delete_sessions(&["e".to_string(), "s2".to_string()]);
        assert!(matches!(outcomes[0].1, Err(DeleteError::UnknownSession { .. })));
        assert!(outcomes[1].1.is_ok());

        let history_after = fs::read_to_string(root.path().join("history.jsonl")).unwrap();
        assert_eq!(history_after, history_before.lines().next().unwrap().to_string() + "\n");
        assert_eq!(manager.sessions().len(), 1);
    }

    #[test]
    fn test_session_title_prefers_custom_title() {
        let root = TempDir::new().unwrap();
        let manager = SessionManager::new(root.path(), 10);
        let path = manager.conversation_file("s1", "/p");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            concat!(
                r#"{"type":"user","userType":"external","message":{"role":"user","content":"  hello  "}}"#,
                "\n",
                r#"{"type":"summary","customTitle":"Named"}"#,
                "\n"
            ),
        )
        .unwrap();

        assert_eq!(manager.session_title("s1", "/p").as_deref(), Some("Named"));
        assert_eq!(manager.session_title("s2", "/p"), None);
    }

    #[test]
    fn test_stats_counts_files() {
        let root = TempDir::new().unwrap();
        write_history(
            root.path(),
            &[
                r#"{"sessionId":"s1","project":"/p","display":"a","timestamp":1}"#,
                r#"{"sessionId":"s1","project":"/p","display":"a2","timestamp":2}"#,
            ],
        );
        let manager_layout = ClaudeLayout::new(root.path());
        let conversation = manager_layout.conversation_path("s1", "/p");
        fs::create_dir_all(conversation.parent().unwrap()).unwrap();
        fs::write(&conversation, "0123456789").unwrap();
        fs::create_dir_all(manager_layout.debug_dir()).unwrap();
        fs::write(manager_layout.debug_path("old"), "12345").unwrap();

        let mut manager = SessionManager::new(root.path(), 10);
        manager.load_sessions().unwrap();
        let stats = manager.stats();

        assert_eq!(stats.history_records, 2);
        assert_eq!(stats.unique_sessions, 1);
        assert_eq!(stats.conversation_files, 1);
        assert_eq!(stats.conversation_bytes, 10);
        assert_eq!(stats.debug_files, 1);
        assert_eq!(stats.debug_bytes, 5);
        assert_eq!(stats.total_bytes(), stats.history_bytes + 15);
        assert_eq!(manager.project_count(), 1);
    }
}
