//! Size accounting and guarded removal.
//!
//! Non-existent paths are not errors here: sizes are 0 and removals report `false`,
//! which keeps repeated deletes and sweeps idempotent.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Size of a regular file, 0 if it does not exist or is not a file.
pub fn file_size(path: &Path) -> u64 {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => 0,
    }
}

/// True for a regular file, false for symlinks and everything else.
pub fn is_real_file(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.is_file())
}

/// True for a directory that is not reached through a symlink.
pub fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.is_dir())
}

/// Recursive sum of regular-file sizes below `path`, 0 if it does not exist or is a
/// symlink. Entries that cannot be read are skipped. Symlinks are not followed.
pub fn dir_size(path: &Path) -> u64 {
    if !is_real_dir(path) {
        return 0;
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Remove a regular file. `Ok(false)` when `path` is missing or is not a regular file;
/// symlinks are left alone like in [`remove_dir_if_exists`].
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if !is_real_file(path) {
        return Ok(false);
    }
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// Remove a directory tree. `Ok(false)` when `path` is missing or is not a directory.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !is_real_dir(path) {
        return Ok(false);
    }
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// True when `path` is a directory with no entries.
pub fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).map(|mut entries| entries.next().is_none()).unwrap_or(false)
}
