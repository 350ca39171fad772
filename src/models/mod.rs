//! Data models for Claude Code's local session storage.
//!
//! - [`SessionRecord`] - One line of history.jsonl
//! - [`ConversationMessage`] - One line of a session's conversation file
//! - [`RankedSession`] - Deduplicated session with derived ordering flags
//! - [`ProjectInfo`] - A discovered project directory and its conversation files
//! - [`DeletionPlan`] / [`DeletionResult`] - Per-session delete preview and outcome
//! - [`OrphanPlan`] / [`SweepResult`] - Orphan sweep preview and outcome
//!
//! Optional JSON fields are normalised at the parse boundary by the deserializers in
//! `parsers::deserializers`, so consumers never re-check for missing keys.

pub mod history;
pub mod plan;
pub mod project;
pub mod session;

pub use history::{
    ContentPart, ConversationMessage, MessageBody, MessageContent, MessageKind, SessionRecord,
};
pub use plan::{
    Artifact, ArtifactKind, DeletionPlan, DeletionResult, OrphanPlan, SweepResult,
};
pub use project::ProjectInfo;
pub use session::{RankedSession, StorageStats};
