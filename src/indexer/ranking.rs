use std::cmp::Reverse;
use std::collections::HashSet;

use crate::models::{RankedSession, SessionRecord};
use crate::utils::{ClaudeLayout, file_size};

/// One record per session id, the most recent one, newest first.
///
/// Records are stably sorted by timestamp descending and the first occurrence of each
/// id is kept, so ties resolve to the earlier line in the file. Records without a
/// session id are dropped. This is the raw deduplicated view, before display ranking.
pub fn dedupe_sessions(records: &[SessionRecord]) -> Vec<SessionRecord> {
    let mut sorted: Vec<&SessionRecord> = records.iter().collect();
    sorted.sort_by_key(|record| Reverse(record.timestamp));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|record| match record.session_id.as_deref() {
            Some(id) => seen.insert(id),
            None => false,
        })
        .cloned()
        .collect()
}

/// Order deduplicated records for display:
/// sessions with a conversation file first, then non-command before local-command
/// entries, newest first within each bucket.
///
/// `conversation_size` reports the size of a record's conversation file (0 if none).
pub fn rank_sessions<F>(unique: Vec<SessionRecord>, conversation_size: F) -> Vec<RankedSession>
where
    F: Fn(&SessionRecord) -> u64,
{
    let mut ranked: Vec<RankedSession> = unique
        .into_iter()
        .map(|record| {
            let size = conversation_size(&record);
            RankedSession {
                has_file: size > 0,
                is_local_command: record.is_local_command(),
                conversation_size: size,
                record,
            }
        })
        .collect();

    ranked.sort_by_key(|s| (!s.has_file, s.is_local_command, Reverse(s.record.timestamp)));
    ranked
}

/// Size of the record's conversation file under `layout`; 0 without a project.
pub fn conversation_size(layout: &ClaudeLayout, record: &SessionRecord) -> u64 {
    match (record.session_id.as_deref(), record.project.as_deref()) {
        (Some(id), Some(project)) => file_size(&layout.conversation_path(id, project)),
        _ => 0,
    }
}

/// Deduplicate and rank against the files present under `layout`.
pub fn unique_sessions(records: &[SessionRecord], layout: &ClaudeLayout) -> Vec<RankedSession> {
    rank_sessions(dedupe_sessions(records), |record| conversation_size(layout, record))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::Map;

    use super::*;

    fn record(id: Option<&str>, display: &str, ts: i64) -> SessionRecord {
        SessionRecord {
            display: display.to_string(),
            timestamp: ts,
            project: Some("/p".to_string()),
            session_id: id.map(str::to_string),
            custom_title: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_dedupe_keeps_most_recent_per_id() {
        let records = vec![
            record(Some("a"), "a-old", 100),
            record(Some("b"), "b-only", 150),
            record(Some("a"), "a-new", 300),
            record(Some("a"), "a-mid", 200),
        ];

        let unique = dedupe_sessions(&records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].display, "a-new");
        assert_eq!(unique[1].display, "b-only");
    }

    #[test]
    fn test_dedupe_drops_records_without_id() {
        let records = vec![record(None, "anon", 999), record(Some("a"), "a", 1)];
        let unique = dedupe_sessions(&records);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].session_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_dedupe_tie_keeps_earlier_line() {
        let records = vec![record(Some("a"), "first", 100), record(Some("a"), "second", 100)];
        assert_eq!(dedupe_sessions(&records)[0].display, "first");
    }

    #[test]
    fn test_dedupe_result_is_max_timestamp_for_every_id() {
        let mut records = Vec::new();
        for i in 0..60i64 {
            let id = format!("s{}", i % 7);
            records.push(record(Some(&id), &format!("r{}", i), (i * 37) % 101));
        }

        let unique = dedupe_sessions(&records);
        let mut max_by_id: HashMap<&str, i64> = HashMap::new();
        for r in &records {
            let entry = max_by_id.entry(r.session_id.as_deref().unwrap()).or_insert(i64::MIN);
            *entry = (*entry).max(r.timestamp);
        }

        assert_eq!(unique.len(), max_by_id.len());
        for r in &unique {
            assert_eq!(r.timestamp, max_by_id[r.session_id.as_deref().unwrap()]);
        }
    }

    #[test]
    fn test_rank_orders_files_then_commands_then_recency() {
        // A: has file, ts 100. B: no file, ts 200. C: local command with file, ts 300.
        let unique = vec![
            record(Some("c"), "/clear", 300),
            record(Some("b"), "question b", 200),
            record(Some("a"), "question a", 100),
        ];

        let ranked = rank_sessions(unique, |r| if r.session_id.as_deref() == Some("b") { 0 } else { 10 });
        let order: Vec<&str> = ranked.iter().map(|s| s.session_id()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
        assert!(ranked[1].is_local_command);
        assert!(!ranked[2].has_file);
    }

    #[test]
    fn test_rank_newest_first_within_bucket() {
        let unique = vec![record(Some("x"), "x", 1), record(Some("y"), "y", 3), record(Some("z"), "z", 2)];
        let ranked = rank_sessions(unique, |_| 0);
        let order: Vec<&str> = ranked.iter().map(|s| s.session_id()).collect();
        assert_eq!(order, vec!["y", "z", "x"]);
    }

    #[test]
    fn test_conversation_size_without_project_is_zero() {
        let layout = ClaudeLayout::new("/nonexistent");
        let mut r = record(Some("a"), "a", 1);
        r.project = None;
        assert_eq!(conversation_size(&layout, &r), 0);
    }
}
