// ABOUTME: File-system operations backing the editor sidebar
// ABOUTME: Directory listing, search in markdown files, rename, delete and pasted-image storage

use crate::errors::{Result, VomitError};
use crate::utils;
use base64::Engine;
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Queries shorter than this return no results.
pub const MIN_QUERY_LEN: usize = 2;
/// Matches kept per file.
pub const MAX_MATCHES_PER_FILE: usize = 10;
/// Characters of a matching line kept in a result.
pub const MATCH_PREVIEW_CHARS: usize = 100;

const IMAGES_DIR: &str = "images";
const TEMP_IMAGES_DIR: &str = "vomit-images";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub is_markdown: bool,
}

/// List a directory for the file tree: hidden entries skipped, directories
/// first, then by name. An unreadable directory lists as empty.
pub fn list_directory(dir: &Path) -> Vec<DirEntry> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read directory {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut items: Vec<DirEntry> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if utils::is_hidden(&name) {
                return None;
            }
            let is_directory = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            Some(DirEntry {
                is_markdown: !is_directory && utils::is_markdown_name(&name),
                path: entry.path(),
                name,
                is_directory,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });
    items
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    /// One-based line number.
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatches {
    pub file: String,
    pub path: PathBuf,
    pub matches: Vec<LineMatch>,
}

/// Case-insensitive substring search through every markdown file under
/// `dir`. Unreadable files and directories are skipped.
pub fn search_in_files(dir: &Path, query: &str) -> Vec<FileMatches> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let mut results = Vec::new();
    search_dir(dir, &needle, &mut results);
    debug!(
        "Search for {:?} in {:?} matched {} files",
        query,
        dir,
        results.len()
    );
    results
}

fn search_dir(dir: &Path, needle: &str, results: &mut Vec<FileMatches>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if utils::is_hidden(&name) {
            continue;
        }

        let path = entry.path();
        let is_directory = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_directory {
            search_dir(&path, needle, results);
        } else if utils::is_markdown_name(&name) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let matches: Vec<LineMatch> = content
                .split('\n')
                .enumerate()
                .filter(|(_, line)| line.to_lowercase().contains(needle))
                .take(MAX_MATCHES_PER_FILE)
                .map(|(index, line)| LineMatch {
                    line: index + 1,
                    text: line.trim().chars().take(MATCH_PREVIEW_CHARS).collect(),
                })
                .collect();

            if !matches.is_empty() {
                results.push(FileMatches {
                    file: name,
                    path,
                    matches,
                });
            }
        }
    }
}

/// Rename a file or folder within its directory. An existing target is
/// reported as [`VomitError::AlreadyExists`].
pub fn rename_item(old_path: &Path, new_name: &str) -> Result<PathBuf> {
    let new_path = match old_path.parent() {
        Some(dir) => dir.join(new_name),
        None => PathBuf::from(new_name),
    };

    if new_path.exists() {
        return Err(VomitError::AlreadyExists(new_path));
    }

    fs::rename(old_path, &new_path)?;
    info!("Renamed {:?} to {:?}", old_path, new_path);
    Ok(new_path)
}

/// Delete a file, or a directory with everything in it.
pub fn delete_item(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    info!("Deleted {:?}", path);
    Ok(())
}

/// Store a pasted image next to the document.
///
/// `image_data` is base64, optionally with a `data:image/...;base64,`
/// prefix. Images go to `images/` beside `document_path`, or to a temporary
/// directory for an unsaved document. Returns `images/{name}` for a saved
/// document and the absolute path otherwise.
pub fn save_image(
    image_data: &str,
    suggested_name: Option<&str>,
    document_path: Option<&Path>,
) -> Result<PathBuf> {
    let bytes = decode_image_data(image_data)?;

    let images_dir = match document_path.and_then(Path::parent) {
        Some(dir) => dir.join(IMAGES_DIR),
        None => std::env::temp_dir().join(TEMP_IMAGES_DIR),
    };
    utils::ensure_directory_exists(&images_dir)?;

    let file_name = suggested_name
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| default_image_name(&bytes));

    let file_path = images_dir.join(&file_name);
    fs::write(&file_path, &bytes)?;
    info!("Saved image {:?} ({} bytes)", file_path, bytes.len());

    if document_path.is_some() {
        Ok(Path::new(IMAGES_DIR).join(file_name))
    } else {
        Ok(file_path)
    }
}

fn decode_image_data(image_data: &str) -> Result<Vec<u8>> {
    let payload = match image_data.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:image/") => payload,
        _ => image_data,
    };
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(VomitError::ImageDataError("no image bytes".to_string()));
    }
    Ok(bytes)
}

fn default_image_name(bytes: &[u8]) -> String {
    let extension = image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("png");
    format!(
        "image-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        extension
    )
}
