//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use claude_session_manager::ClaudeLayout;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for creating test .claude directory structures
pub struct ClaudeDirBuilder {
    temp_dir: TempDir,
}

impl ClaudeDirBuilder {
    /// Create a new builder with an empty .claude directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the .claude directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn layout(&self) -> ClaudeLayout {
        ClaudeLayout::new(self.temp_dir.path())
    }

    /// Write history.jsonl verbatim
    pub fn with_history(self, content: &str) -> Self {
        fs::write(self.layout().history_file(), content).expect("Failed to write history.jsonl");
        self
    }

    /// Write history.jsonl from entries, one per line
    pub fn with_history_entries(self, entries: &[HistoryEntryBuilder]) -> Self {
        let content: String = entries.iter().map(|e| e.to_json() + "\n").collect();
        self.with_history(&content)
    }

    /// Conversation file for `session_id` under the encoded `project` directory
    pub fn with_conversation(
        self,
        session_id: &str,
        project: &str,
        conversation: &ConversationBuilder,
    ) -> Self {
        let path = self.layout().conversation_path(session_id, project);
        write_file(&path, &conversation.to_jsonl());
        self
    }

    pub fn with_debug_log(self, session_id: &str, content: &str) -> Self {
        write_file(&self.layout().debug_path(session_id), content);
        self
    }

    /// Session environment directory holding one file
    pub fn with_session_env(self, session_id: &str, content: &str) -> Self {
        write_file(&self.layout().env_dir(session_id).join("env.sh"), content);
        self
    }

    /// File-history directory holding one snapshot
    pub fn with_file_history(self, session_id: &str, content: &str) -> Self {
        write_file(&self.layout().file_history_dir(session_id).join("snapshot@v1"), content);
        self
    }

    /// Todo file `<session_id>-<suffix>.json`
    pub fn with_todo(self, session_id: &str, suffix: &str, content: &str) -> Self {
        let path = self.layout().todos_dir().join(format!("{session_id}-{suffix}.json"));
        write_file(&path, content);
        self
    }

    /// Every artifact kind for one session
    pub fn with_all_artifacts(self, session_id: &str, project: &str) -> Self {
        self.with_conversation(
            session_id,
            project,
            &ConversationBuilder::new().user(&format!("hello from {session_id}")),
        )
        .with_debug_log(session_id, "debug output")
        .with_session_env(session_id, "export A=1")
        .with_file_history(session_id, "snapshot")
        .with_todo(session_id, &format!("agent-{session_id}"), "[]")
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ClaudeDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for history.jsonl entries
pub struct HistoryEntryBuilder {
    display: String,
    timestamp: i64,
    session_id: Option<String>,
    project: Option<String>,
    custom_title: Option<String>,
}

impl HistoryEntryBuilder {
    /// Create a new history entry with default values
    pub fn new() -> Self {
        Self {
            display: "Test entry".to_string(),
            timestamp: 1_700_000_000_000,
            session_id: Some("s1".to_string()),
            project: None,
            custom_title: None,
        }
    }

    pub fn display(mut self, display: &str) -> Self {
        self.display = display.to_string();
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn session_id(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    /// Serialize `"sessionId": null`
    pub fn without_session_id(mut self) -> Self {
        self.session_id = None;
        self
    }

    pub fn project(mut self, project: &str) -> Self {
        self.project = Some(project.to_string());
        self
    }

    pub fn custom_title(mut self, title: &str) -> Self {
        self.custom_title = Some(title.to_string());
        self
    }

    /// Convert to a single JSON line (no trailing newline)
    pub fn to_json(&self) -> String {
        let mut value = json!({
            "display": self.display,
            "pastedContents": {},
            "timestamp": self.timestamp,
            "sessionId": self.session_id,
        });
        if let Some(project) = &self.project {
            value["project"] = Value::from(project.as_str());
        }
        if let Some(title) = &self.custom_title {
            value["customTitle"] = Value::from(title.as_str());
        }
        value.to_string()
    }
}

impl Default for HistoryEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for conversation files, one JSON object per message
#[derive(Default)]
pub struct ConversationBuilder {
    lines: Vec<String>,
}

impl ConversationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// External user message with string content
    pub fn user(self, text: &str) -> Self {
        self.user_at(text, "2024-01-01T00:00:00.000Z")
    }

    pub fn user_at(mut self, text: &str, timestamp: &str) -> Self {
        self.lines.push(
            json!({
                "type": "user",
                "userType": "external",
                "message": {"role": "user", "content": text},
                "timestamp": timestamp,
            })
            .to_string(),
        );
        self
    }

    /// Assistant message from raw content parts
    pub fn assistant_parts(mut self, parts: Value) -> Self {
        self.lines.push(
            json!({
                "type": "assistant",
                "message": {"role": "assistant", "content": parts},
                "timestamp": "2024-01-01T00:00:01.000Z",
            })
            .to_string(),
        );
        self
    }

    pub fn assistant(self, text: &str) -> Self {
        self.assistant_parts(json!([{"type": "text", "text": text}]))
    }

    pub fn tool_result(mut self, content: &str) -> Self {
        self.lines.push(json!({"type": "tool_result", "content": content}).to_string());
        self
    }

    pub fn custom_title(mut self, title: &str) -> Self {
        self.lines.push(json!({"type": "custom-title", "customTitle": title}).to_string());
        self
    }

    /// A line with only a timestamp, for liveness tests
    pub fn activity_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.lines.push(json!({"type": "assistant", "timestamp": timestamp.to_rfc3339()}).to_string());
        self
    }

    /// Append a raw (possibly malformed) line
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_jsonl(&self) -> String {
        self.lines.iter().map(|line| format!("{line}\n")).collect()
    }
}

/// Create parent directories and write `content`
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Backdate a file's modification time
pub fn set_age(path: &Path, age: Duration) {
    let file = File::options().write(true).open(path).expect("Failed to open file");
    file.set_modified(SystemTime::now() - age).expect("Failed to set mtime");
}

/// Every path below `root`, relative and sorted, for before/after comparisons
pub fn snapshot_tree(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    paths.sort();
    paths
}

/// Helper to create a minimal valid .claude directory
pub fn minimal_claude_dir() -> TempDir {
    ClaudeDirBuilder::new().with_history("").build()
}

/// Three sessions {"a", "b", "c"}: "a" and "b" are in the history, "c" is not
pub fn orphan_claude_dir() -> TempDir {
    ClaudeDirBuilder::new()
        .with_history_entries(&[
            HistoryEntryBuilder::new().session_id("a").project("/work/app").timestamp(100),
            HistoryEntryBuilder::new().session_id("b").project("/work/app").timestamp(200),
        ])
        .with_all_artifacts("a", "/work/app")
        .with_all_artifacts("b", "/work/app")
        .with_all_artifacts("c", "/work/app")
        .build()
}
