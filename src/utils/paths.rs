use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

pub const HISTORY_FILE: &str = "history.jsonl";
pub const PROJECTS_DIR: &str = "projects";
pub const DEBUG_DIR: &str = "debug";
pub const SESSION_ENV_DIR: &str = "session-env";
pub const FILE_HISTORY_DIR: &str = "file-history";
pub const TODOS_DIR: &str = "todos";

pub const CONVERSATION_EXTENSION: &str = "jsonl";
pub const DEBUG_EXTENSION: &str = "txt";
pub const TODO_EXTENSION: &str = "json";

/// Encodes a project path into Claude's project directory name by replacing every
/// path separator with a dash.
///
/// The mapping is lossy: `/foo/bar` and `/foo-bar` both become `-foo-bar`.
///
/// # Examples
///
/// ```
/// use claude_session_manager::encode_project_path;
///
/// assert_eq!(encode_project_path("/Users/foo/bar"), "-Users-foo-bar");
/// ```
pub fn encode_project_path(project_path: &str) -> String {
    project_path
        .chars()
        .map(|c| if c == '/' || std::path::is_separator(c) { '-' } else { c })
        .collect()
}

/// Locations of every artifact store under one Claude data directory.
///
/// All methods are pure path construction except [`ClaudeLayout::todo_files`], which
/// lists the todos directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeLayout {
    root: PathBuf,
}

impl ClaudeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    pub fn debug_dir(&self) -> PathBuf {
        self.root.join(DEBUG_DIR)
    }

    pub fn session_env_root(&self) -> PathBuf {
        self.root.join(SESSION_ENV_DIR)
    }

    pub fn file_history_root(&self) -> PathBuf {
        self.root.join(FILE_HISTORY_DIR)
    }

    pub fn todos_dir(&self) -> PathBuf {
        self.root.join(TODOS_DIR)
    }

    /// `<projects>/<encoded project>/<session id>.jsonl`
    pub fn conversation_path(&self, session_id: &str, project_path: &str) -> PathBuf {
        self.projects_dir()
            .join(encode_project_path(project_path))
            .join(format!("{session_id}.{CONVERSATION_EXTENSION}"))
    }

    pub fn debug_path(&self, session_id: &str) -> PathBuf {
        self.debug_dir().join(format!("{session_id}.{DEBUG_EXTENSION}"))
    }

    pub fn env_dir(&self, session_id: &str) -> PathBuf {
        self.session_env_root().join(session_id)
    }

    pub fn file_history_dir(&self, session_id: &str) -> PathBuf {
        self.file_history_root().join(session_id)
    }

    /// Todo files named `<session id>-*.json`, sorted by path. A missing directory yields none.
    pub fn todo_files(&self, session_id: &str) -> Vec<PathBuf> {
        let prefix = format!("{session_id}-");
        let Ok(entries) = fs::read_dir(self.todos_dir()) else {
            return Vec::new();
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                has_extension(path, TODO_EXTENSION)
                    && path
                        .file_name()
                        .map(|name| name.to_string_lossy().starts_with(&prefix))
                        .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    }
}

/// Case-sensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().map(|ext| ext == extension).unwrap_or(false)
}

/// File name without its final extension, as the session id of stem-named artifacts.
pub fn file_stem_string(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use claude_session_manager::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/.claude");
/// // Returns "~/.claude" if the home directory is /Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    let home = dirs::home_dir();
    format_path_with_tilde_internal(path, home.as_deref())
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }

    match path.to_string_lossy() {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
