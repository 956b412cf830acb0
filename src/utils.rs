// ABOUTME: Utility functions for the vomit presentation core
// ABOUTME: Provides path validation, directory creation and file classification helpers

use crate::errors::{Result, VomitError};
use std::path::{Path, PathBuf};

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(VomitError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(VomitError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(VomitError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory_exists(parent),
        _ => Ok(()),
    }
}

/// Get the absolute path
pub fn get_absolute_path(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| {
        VomitError::ValidationError(format!("Failed to get absolute path for {:?}: {}", path, e))
    })
}

/// Directory of a document as a string, for resolving relative assets.
/// Relative paths are made absolute when possible so `file://` URIs work.
pub fn base_dir_of(file_path: &Path) -> String {
    let parent = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = get_absolute_path(&parent).unwrap_or(parent);
    parent.to_string_lossy().into_owned()
}

/// Dot-prefixed names are hidden from listings and searches.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn is_markdown_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            MARKDOWN_EXTENSIONS.contains(&ext.as_ref())
        })
        .unwrap_or(false)
}
