use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::SessionRecord;

/// Parse history.jsonl into records, oldest first (file order).
///
/// Every line is an independent JSON object. Lines that do not parse are skipped: the
/// file is hand-editable and may be appended to while we read it. A missing file is an
/// empty history, not an error.
pub fn load_history_file(path: &Path) -> Result<Vec<SessionRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to open history file: {}", path.display()));
        }
    };

    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut line = Vec::new();
    let mut line_num = 0usize;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("Failed to read history file: {}", path.display()))?;
        if read == 0 {
            break;
        }
        line_num += 1;

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<SessionRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(line = line_num, error = %e, "skipping malformed history line");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!(records = records.len(), skipped, "parsed history file");
    }

    Ok(records)
}

/// Every session id mentioned anywhere in the history, superseded records included.
pub fn history_session_ids(records: &[SessionRecord]) -> HashSet<String> {
    records.iter().filter_map(|record| record.session_id.clone()).collect()
}

/// Remove every history line whose raw text contains `needle`, returning how many went.
///
/// This is a substring match on the line bytes, not a field comparison: an id that
/// happens to occur inside another record's project path or display text takes that
/// line with it. Kept lines are written back byte-for-byte through a temporary file
/// that is renamed over the original. Nothing is written when no line matches.
///
/// There is no locking; a line appended by another process between the read and the
/// rename is lost.
pub fn remove_history_lines(path: &Path, needle: &str) -> Result<usize> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read history file: {}", path.display()));
        }
    };

    let needle = needle.as_bytes();
    let mut kept = Vec::with_capacity(bytes.len());
    let mut removed = 0usize;
    for line in bytes.split_inclusive(|b| *b == b'\n') {
        if contains_bytes(line, needle) {
            removed += 1;
        } else {
            kept.extend_from_slice(line);
        }
    }

    if removed == 0 {
        return Ok(0);
    }

    replace_file(path, &kept)?;
    Ok(removed)
}

/// Write `contents` to a sibling temp file and rename it over `path`. The temp file
/// does not outlive a failed write or rename.
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let temp = temp_path(path);
    let replaced = fs::write(&temp, contents)
        .with_context(|| format!("Failed to write history temp file: {}", temp.display()))
        .and_then(|()| {
            fs::rename(&temp, path)
                .with_context(|| format!("Failed to replace history file: {}", path.display()))
        });

    if replaced.is_err()
        && let Err(e) = fs::remove_file(&temp)
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %temp.display(), error = %e, "failed to remove history temp file");
    }
    replaced
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
