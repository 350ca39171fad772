use std::path::PathBuf;

/// A subdirectory of `projects/` and the conversation files found directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Directory name, i.e. the project path with separators replaced by dashes.
    pub encoded_name: String,
    pub project_dir: PathBuf,
    pub conversation_files: Vec<PathBuf>,
}
