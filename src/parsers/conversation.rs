use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::ops::ControlFlow;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{ContentPart, ConversationMessage, MessageContent, MessageKind};
use crate::utils::terminal::{clean_command_markup, truncate_chars};

/// Tool output is cut to this many characters in a transcript.
const TOOL_PREVIEW_CHARS: usize = 200;

/// Walk a JSONL file, handing each line that deserializes as `T` to `visit`.
/// Malformed lines are skipped. Returns `Ok(false)` if the file does not exist.
fn visit_json_lines<T, F>(path: &Path, mut visit: F) -> Result<bool>
where
    T: DeserializeOwned,
    F: FnMut(T) -> ControlFlow<()>,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to open {}", path.display()));
        }
    };

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut skipped = 0usize;
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<T>(&line) {
            Ok(value) => {
                if visit(value).is_break() {
                    break;
                }
            }
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(path = %path.display(), skipped, "skipped malformed conversation lines");
    }
    Ok(true)
}

/// Parse a session's conversation file. A missing file is an empty conversation.
pub fn load_conversation_file(path: &Path) -> Result<Vec<ConversationMessage>> {
    let mut messages = Vec::new();
    visit_json_lines(path, |message: ConversationMessage| {
        messages.push(message);
        ControlFlow::Continue(())
    })?;
    Ok(messages)
}

#[derive(Deserialize)]
struct TimestampOnly {
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

/// Largest message timestamp in the file. Every line is read: the newest message is not
/// necessarily the last one.
pub fn latest_message_timestamp(path: &Path) -> Result<Option<DateTime<Utc>>> {
    let mut latest: Option<DateTime<Utc>> = None;
    visit_json_lines(path, |line: TimestampOnly| {
        if let Some(ts) = line.timestamp
            && latest.is_none_or(|current| ts > current)
        {
            latest = Some(ts);
        }
        ControlFlow::Continue(())
    })?;
    Ok(latest)
}

/// Session title: an explicit `customTitle` anywhere in the file wins, otherwise the
/// first external user message with non-empty string content, trimmed.
pub fn session_title(path: &Path) -> Result<Option<String>> {
    let mut custom_title = None;
    let mut first_user_message = None;

    visit_json_lines(path, |message: ConversationMessage| {
        if message.custom_title.is_some() {
            custom_title = message.custom_title;
            return ControlFlow::Break(());
        }
        if first_user_message.is_none()
            && message.is_external_user()
            && let Some(body) = message.message
            && let MessageContent::Text(text) = body.content
        {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                first_user_message = Some(trimmed.to_string());
            }
        }
        ControlFlow::Continue(())
    })?;

    Ok(custom_title.or(first_user_message))
}

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    Tool,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::Assistant => "Claude",
            Speaker::Tool => "Tool result",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
}

/// Flatten a conversation into readable speaker/text lines.
///
/// - external user turns with string content, command markup removed
/// - assistant text parts joined by newlines; thinking is dropped; tool calls become
///   `[tool: name]` markers
/// - tool and tool_result lines, truncated
/// - snapshots and everything else are skipped
pub fn transcript(messages: &[ConversationMessage]) -> Vec<TranscriptLine> {
    let mut lines = Vec::new();

    for message in messages {
        match message.kind {
            MessageKind::FileHistorySnapshot => continue,
            MessageKind::Tool | MessageKind::ToolResult => {
                if let Some(content) = message.content.as_ref().filter(|c| !is_blank(c)) {
                    let text = match content {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    lines.push(TranscriptLine {
                        speaker: Speaker::Tool,
                        text: truncate_chars(&text, TOOL_PREVIEW_CHARS),
                    });
                }
                continue;
            }
            _ => {}
        }

        let Some(body) = message.message.as_ref() else {
            continue;
        };

        if message.is_external_user() {
            if let MessageContent::Text(text) = &body.content {
                let cleaned = clean_command_markup(text);
                if !cleaned.is_empty() {
                    lines.push(TranscriptLine { speaker: Speaker::User, text: cleaned });
                }
            }
        } else if message.kind == MessageKind::Assistant
            || message.user_type.as_deref() == Some("assistant")
        {
            if let MessageContent::Parts(parts) = &body.content {
                let rendered: Vec<String> = parts
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::Text { text } if !text.is_empty() => Some(text.clone()),
                        ContentPart::ToolUse { name, .. } => {
                            let name = if name.is_empty() { "unknown" } else { name };
                            Some(format!("[tool: {}]", name))
                        }
                        _ => None,
                    })
                    .collect();
                if !rendered.is_empty() {
                    lines.push(TranscriptLine {
                        speaker: Speaker::Assistant,
                        text: rendered.join("\n"),
                    });
                }
            }
        }
    }

    lines
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
