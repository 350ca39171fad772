//! JSONL parsers for Claude Code history and conversation files
//!
//! # Error Handling Strategy
//!
//! Both files are append-only logs written by another process and occasionally edited
//! by hand, so parsing is tolerant:
//!
//! - **Individual line failures**: A line that is not valid JSON, or not an object of
//!   the expected shape, is skipped and counted at `debug` level. Loading never fails
//!   because of file content.
//!
//! - **Field-level tolerance**: Missing, null or oddly typed optional fields fall back
//!   to defaults in `deserializers` instead of rejecting the whole line.
//!
//! - **Missing files**: A file that does not exist reads as empty.
//!
//! - **I/O failures**: Anything else (permissions, read errors) is returned as an
//!   `anyhow::Error` with the offending path in its context.

pub mod conversation;
pub mod deserializers;
pub mod history;

pub use conversation::{
    Speaker, TranscriptLine, latest_message_timestamp, load_conversation_file, session_title,
    transcript,
};
pub use history::{history_session_ids, load_history_file, remove_history_lines};
