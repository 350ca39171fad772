//! Session indexing over the Claude data directory
//!
//! - **Project discovery**: enumerates `projects/<encoded path>/` directories and the
//!   conversation files directly inside them.
//!
//! - **Liveness**: derives the set of session ids that look active right now from
//!   debug-log mtimes and the newest message timestamp in each conversation file.
//!
//! - **Ranking**: collapses the append-only history into one record per session id and
//!   orders the result for triage (real conversations first, local commands last,
//!   newest first).
//!
//! Unreadable entries are skipped and logged; none of these scans fail on file content.

pub mod liveness;
pub mod project_discovery;
pub mod ranking;

pub use liveness::{DEFAULT_ACTIVE_WINDOW_MINUTES, LivenessDetector, active_session_ids};
pub use project_discovery::discover_projects;
pub use ranking::{dedupe_sessions, rank_sessions, unique_sessions};
