use serde::Serialize;

use super::history::SessionRecord;

/// A deduplicated session with the derived flags used for ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSession {
    #[serde(flatten)]
    pub record: SessionRecord,
    pub has_file: bool,
    pub is_local_command: bool,
    /// Size in bytes of the conversation file, 0 when there is none.
    pub conversation_size: u64,
}

impl RankedSession {
    /// Records without an id never survive deduplication, so this is always set in practice.
    pub fn session_id(&self) -> &str {
        self.record.session_id.as_deref().unwrap_or_default()
    }

    pub fn project(&self) -> Option<&str> {
        self.record.project.as_deref()
    }

    /// Case-insensitive substring match on id, display text and project path.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        [Some(self.session_id()), Some(self.record.display.as_str()), self.project()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Aggregate sizes over the whole data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub history_records: usize,
    pub unique_sessions: usize,
    pub conversation_files: usize,
    pub conversation_bytes: u64,
    pub debug_files: usize,
    pub debug_bytes: u64,
    pub history_bytes: u64,
}

impl StorageStats {
    pub fn total_bytes(&self) -> u64 {
        self.history_bytes + self.debug_bytes + self.conversation_bytes
    }
}
