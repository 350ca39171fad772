//! Destructive operations: per-session deletion and the orphan sweep.
//!
//! Both come in a preview form that only reads the disk and an executing form. The
//! executing forms are best-effort: each artifact is removed independently and a
//! failure is recorded in the returned result rather than aborting the rest.

pub mod deletion;
pub mod orphans;

pub use deletion::{delete_session, preview_deletion};
pub use orphans::{preview_orphans, sweep};
