//! Claude Session Manager - Inventory and prune Claude Code's local session data
//!
//! Claude Code keeps an append-only `history.jsonl` index under `~/.claude/` plus several
//! per-session stores (conversation files, debug logs, environment snapshots,
//! file-history snapshots, todo files). This library:
//!
//! - Parses the history index and conversation files, tolerating malformed lines
//! - Deduplicates sessions and ranks them for triage
//! - Detects live sessions from recent debug-log and conversation activity
//! - Previews and performs per-session deletion across every store
//! - Finds and sweeps orphaned artifacts no history entry refers to
//!
//! # Example
//!
//! ```no_run
//! use claude_session_manager::SessionManager;
//!
//! let mut manager = SessionManager::new("/Users/alice/.claude", 10);
//! manager.reload()?;
//! for session in manager.unique_sessions().iter().take(5) {
//!     println!("{} {}", session.session_id(), session.record.display);
//! }
//! let orphans = manager.preview_orphans();
//! println!("{} orphaned artifacts", orphans.artifacts.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod error;
pub mod indexer;
pub mod manager;
pub mod models;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::DeleteError;
pub use manager::SessionManager;
pub use models::{DeletionPlan, DeletionResult, OrphanPlan, RankedSession, SessionRecord, SweepResult};
pub use parsers::history::load_history_file;
pub use utils::paths::{ClaudeLayout, encode_project_path, format_path_with_tilde};
