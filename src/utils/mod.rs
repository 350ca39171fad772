pub mod environment;
pub mod format;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod terminal;

pub use environment::{get_claude_dir, resolve_claude_dir};
pub use format::{format_relative, format_size, format_timestamp};
pub use fs::{dir_size, file_size};
pub use logging::setup_tracing;
pub use paths::{ClaudeLayout, encode_project_path, format_path_with_tilde};
