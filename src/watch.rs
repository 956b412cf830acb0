// ABOUTME: Watch module for monitoring the presented markdown file
// ABOUTME: Debounces file system events and reports each new version of the content

use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use notify_debouncer_full::new_debouncer;

use crate::errors::{Result, VomitError};
use crate::utils;

/// Configuration for watch mode
pub struct WatchConfig {
    /// Path to the markdown file to watch
    pub markdown_path: PathBuf,

    /// Debounce time in milliseconds
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            markdown_path: PathBuf::new(),
            debounce_ms: 300,
        }
    }
}

/// Last successfully read content of the watched file.
#[derive(Debug, Default)]
pub struct ContentTracker {
    last: String,
}

impl ContentTracker {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            last: initial.into(),
        }
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    /// Re-read `path`. Returns the content when it differs from the last
    /// good read; read failures keep the last good content.
    pub fn refresh(&mut self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(content) if content == self.last => {
                debug!("{:?} unchanged", path);
                None
            }
            Ok(content) => {
                self.last = content.clone();
                Some(content)
            }
            Err(e) => {
                warn!("Failed to read {:?}, keeping last content: {}", path, e);
                None
            }
        }
    }
}

/// Watch the markdown file and call `on_change` with its content after each
/// debounced change. Blocks until the watcher shuts down.
pub fn watch_markdown<F>(config: &WatchConfig, mut on_change: F) -> Result<()>
where
    F: FnMut(String),
{
    utils::validate_file_exists(&config.markdown_path)?;
    let markdown_abs = utils::get_absolute_path(&config.markdown_path)?;
    let mut tracker = ContentTracker::new(fs::read_to_string(&markdown_abs)?);

    // Create a channel to receive file system events
    let (tx, rx) = mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), None, tx)
        .map_err(|e| VomitError::WatchError(format!("Failed to create file watcher: {}", e)))?;

    // Editors often save by replacing the file, so watch its directory.
    let watch_dir = match markdown_abs.parent() {
        Some(parent) => parent.to_path_buf(),
        None => utils::get_absolute_path(Path::new("."))?,
    };

    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| {
            VomitError::WatchError(format!(
                "Failed to start watching directory {:?}: {}",
                watch_dir, e
            ))
        })?;

    info!("Watching {:?} for changes", markdown_abs);

    for result in rx {
        match result {
            Ok(events) => {
                let relevant = events
                    .iter()
                    .any(|event| event.paths.iter().any(|p| is_same_file(p, &markdown_abs)));
                if !relevant {
                    continue;
                }
                if let Some(content) = tracker.refresh(&markdown_abs) {
                    info!("{:?} changed ({} bytes)", markdown_abs, content.len());
                    on_change(content);
                }
            }
            Err(errors) => {
                for e in errors {
                    error!("Watch error: {}", e);
                }
            }
        }
    }

    Ok(())
}

fn is_same_file(path: &Path, target: &Path) -> bool {
    if path == target {
        return true;
    }
    match utils::get_absolute_path(path) {
        Ok(abs) => abs == target,
        Err(_) => false,
    }
}
