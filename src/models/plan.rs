use std::fmt;
use std::path::PathBuf;

/// The five per-session artifact stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Conversation,
    DebugLog,
    SessionEnv,
    FileHistory,
    Todo,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Conversation,
        ArtifactKind::DebugLog,
        ArtifactKind::SessionEnv,
        ArtifactKind::FileHistory,
        ArtifactKind::Todo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Conversation => "conversation",
            ArtifactKind::DebugLog => "debug",
            ArtifactKind::SessionEnv => "session-env",
            ArtifactKind::FileHistory => "file-history",
            ArtifactKind::Todo => "todo",
        }
    }

    /// Directory-shaped artifacts are removed recursively.
    pub fn is_dir(self) -> bool {
        matches!(self, ArtifactKind::SessionEnv | ArtifactKind::FileHistory)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One existing file or directory on disk, with its size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub session_id: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Everything that deleting one session would remove. Built without touching the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    pub session_id: String,
    pub project: Option<String>,
    pub artifacts: Vec<Artifact>,
}

impl DeletionPlan {
    pub fn total_size(&self) -> u64 {
        self.artifacts.iter().map(|a| a.size).sum()
    }

    pub fn size_of(&self, kind: ArtifactKind) -> u64 {
        self.artifacts.iter().filter(|a| a.kind == kind).map(|a| a.size).sum()
    }

    pub fn count_of(&self, kind: ArtifactKind) -> usize {
        self.artifacts.iter().filter(|a| a.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Outcome of deleting one session. Every step is attempted; failures are collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionResult {
    pub session_id: String,
    pub conversation_file: bool,
    pub debug_file: bool,
    pub session_env: bool,
    pub file_history: bool,
    pub todos: usize,
    pub history_entries: usize,
    pub freed_bytes: u64,
    pub errors: Vec<String>,
}

impl DeletionResult {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// All step failures joined into one message.
    pub fn error(&self) -> Option<String> {
        if self.errors.is_empty() { None } else { Some(self.errors.join("; ")) }
    }
}

/// Artifacts whose owning session id is absent from the history index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanPlan {
    pub artifacts: Vec<Artifact>,
    /// Project directories that are empty, or will be once their orphans are gone.
    pub empty_project_dirs: Vec<PathBuf>,
    /// Store directories that could not be read while scanning.
    pub scan_errors: Vec<String>,
}

impl OrphanPlan {
    pub fn total_size(&self) -> u64 {
        self.artifacts.iter().map(|a| a.size).sum()
    }

    pub fn count_of(&self, kind: ArtifactKind) -> usize {
        self.artifacts.iter().filter(|a| a.kind == kind).count()
    }

    /// Nothing to sweep: no orphans and no empty project directories.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.empty_project_dirs.is_empty()
    }
}

/// Outcome of an orphan sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub debug_files: usize,
    pub conversation_files: usize,
    pub session_envs: usize,
    pub file_histories: usize,
    pub todos: usize,
    pub empty_project_dirs: usize,
    pub total_size_freed: u64,
    pub details: Vec<String>,
    /// Individual removals that failed; the sweep carried on past them.
    pub failures: Vec<String>,
    /// Store-level problem (unreadable directory, ...). Counts above are still valid.
    pub error: Option<String>,
}

impl SweepResult {
    pub fn removed(&self) -> usize {
        self.debug_files + self.conversation_files + self.session_envs + self.file_histories + self.todos
    }

    pub(crate) fn record(&mut self, kind: ArtifactKind) {
        match kind {
            ArtifactKind::Conversation => self.conversation_files += 1,
            ArtifactKind::DebugLog => self.debug_files += 1,
            ArtifactKind::SessionEnv => self.session_envs += 1,
            ArtifactKind::FileHistory => self.file_histories += 1,
            ArtifactKind::Todo => self.todos += 1,
        }
    }

    pub(crate) fn push_error(&mut self, message: String) {
        self.error = Some(match self.error.take() {
            Some(existing) => format!("{existing}; {message}"),
            None => message,
        });
    }
}
