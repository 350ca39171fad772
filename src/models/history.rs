use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One line of `history.jsonl`.
///
/// The index is an append log, so several records may share a `session_id`; only the
/// one with the largest `timestamp` is canonical. Absent or malformed optional fields
/// fall back to defaults here instead of failing the whole line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, deserialize_with = "crate::parsers::deserializers::default_on_mismatch")]
    pub display: String,
    /// Milliseconds since the Unix epoch, 0 when missing.
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_timestamp_millis")]
    pub timestamp: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_string"
    )]
    pub project: Option<String>,
    #[serde(
        rename = "sessionId",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_string"
    )]
    pub session_id: Option<String>,
    #[serde(
        rename = "customTitle",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_string"
    )]
    pub custom_title: Option<String>,
    /// Fields this tool does not interpret (`pastedContents`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionRecord {
    /// Slash-prefixed displays are local commands with no conversation behind them.
    pub fn is_local_command(&self) -> bool {
        self.display.starts_with('/')
    }
}

/// Kind of a conversation line, taken from its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "tool")]
    Tool,
    #[serde(rename = "tool_result")]
    ToolResult,
    #[serde(rename = "file-history-snapshot")]
    FileHistorySnapshot,
    #[default]
    #[serde(other)]
    Other,
}

/// A typed part of an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text {
        #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
        text: String,
    },
    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
        thinking: String,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

/// `message.content`: a plain string for user turns, a list of parts for assistant turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::null_as_default")]
    pub content: MessageContent,
}

/// One line of a session's conversation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    #[serde(rename = "type", default, deserialize_with = "crate::parsers::deserializers::default_on_mismatch")]
    pub kind: MessageKind,
    #[serde(
        rename = "userType",
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_string"
    )]
    pub user_type: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_lenient")]
    pub message: Option<MessageBody>,
    /// Unparseable timestamps become `None` so one bad line cannot hide the others.
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(
        rename = "customTitle",
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_string"
    )]
    pub custom_title: Option<String>,
    /// Top-level payload carried by tool result lines.
    #[serde(default)]
    pub content: Option<Value>,
}

impl ConversationMessage {
    pub fn is_external_user(&self) -> bool {
        self.kind == MessageKind::User && self.user_type.as_deref() == Some("external")
    }
}
