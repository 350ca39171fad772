//! Detection of sessions that are probably still running.
//!
//! Two independent signals, unioned:
//!
//! 1. a debug log (`debug/<id>.txt`) modified inside the window;
//! 2. a conversation file whose newest message timestamp falls inside the window.
//!
//! Both stores are scanned exhaustively. Files that cannot be inspected are skipped.

use std::collections::HashSet;
use std::fs;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::indexer::project_discovery::discover_projects;
use crate::parsers::latest_message_timestamp;
use crate::utils::ClaudeLayout;
use crate::utils::paths::{DEBUG_EXTENSION, file_stem_string, has_extension};

/// Default trailing window, in minutes.
pub const DEFAULT_ACTIVE_WINDOW_MINUTES: u64 = 10;

/// Session ids with activity strictly after `now - window`.
pub fn active_session_ids(
    layout: &ClaudeLayout,
    window: TimeDelta,
    now: DateTime<Utc>,
) -> HashSet<String> {
    let cutoff = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut active = HashSet::new();

    if let Ok(entries) = fs::read_dir(layout.debug_dir()) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !has_extension(&path, DEBUG_EXTENSION) {
                continue;
            }
            let Ok(modified) = entry.metadata().and_then(|meta| meta.modified()) else {
                continue;
            };
            if DateTime::<Utc>::from(modified) > cutoff
                && let Some(session_id) = file_stem_string(&path)
            {
                active.insert(session_id);
            }
        }
    }

    let projects = match discover_projects(layout) {
        Ok(projects) => projects,
        Err(e) => {
            warn!(error = %e, "liveness scan could not list projects");
            Vec::new()
        }
    };
    for project in projects {
        for path in project.conversation_files {
            match latest_message_timestamp(&path) {
                Ok(Some(latest)) if latest > cutoff => {
                    if let Some(session_id) = file_stem_string(&path) {
                        active.insert(session_id);
                    }
                }
                Ok(_) => {}
                Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable conversation"),
            }
        }
    }

    active
}

/// Caches the active set between explicit refreshes.
#[derive(Debug, Clone)]
pub struct LivenessDetector {
    window: TimeDelta,
    active: HashSet<String>,
}

impl LivenessDetector {
    pub fn new(window_minutes: u64) -> Self {
        Self { window: window_from_minutes(window_minutes), active: HashSet::new() }
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn set_window_minutes(&mut self, window_minutes: u64) {
        self.window = window_from_minutes(window_minutes);
    }

    /// Rescan both signals and replace the cached set.
    pub fn refresh(&mut self, layout: &ClaudeLayout) -> &HashSet<String> {
        self.refresh_at(layout, Utc::now())
    }

    pub fn refresh_at(&mut self, layout: &ClaudeLayout, now: DateTime<Utc>) -> &HashSet<String> {
        self.active = active_session_ids(layout, self.window, now);
        debug!(active = self.active.len(), "refreshed active sessions");
        &self.active
    }

    pub fn active_ids(&self) -> &HashSet<String> {
        &self.active
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.active.contains(session_id)
    }
}

impl Default for LivenessDetector {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVE_WINDOW_MINUTES)
    }
}

fn window_from_minutes(minutes: u64) -> TimeDelta {
    TimeDelta::try_minutes(i64::try_from(minutes).unwrap_or(i64::MAX))
        .unwrap_or(TimeDelta::MAX)
}
