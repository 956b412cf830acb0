// ABOUTME: The editable document owned by the editing surface
// ABOUTME: Tracks content, file path and dirty state, and renders the full-document preview and status line

use crate::errors::{Result, VomitError};
use crate::markdown::MarkdownRenderer;
use crate::slides;
use crate::utils;
use log::{info, warn};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The single mutable document. Views only ever see snapshots of it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    content: String,
    file_path: Option<PathBuf>,
    dirty: bool,
}

impl Document {
    /// A new, unsaved, empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// An unsaved document with initial content.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        utils::validate_file_exists(path)?;
        let content = fs::read_to_string(path)?;
        info!("Opened {:?} ({} bytes)", path, content.len());
        Ok(Self {
            content,
            file_path: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    /// Re-read the file. On failure the current content is kept.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.file_path.as_ref().ok_or(VomitError::Untitled)?;
        let content = fs::read_to_string(path)?;
        self.content = content;
        self.dirty = false;
        Ok(())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Directory used to resolve relative assets.
    pub fn base_path(&self) -> Option<String> {
        self.file_path.as_deref().map(utils::base_dir_of)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the buffer, e.g. after a keystroke.
    pub fn set_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        if content != self.content {
            self.content = content;
            self.dirty = true;
        }
    }

    /// The file changed on disk; its content becomes the saved state.
    pub fn external_change(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.dirty = false;
    }

    pub fn save(&mut self) -> Result<()> {
        let path = self.file_path.clone().ok_or(VomitError::Untitled)?;
        self.write_to(&path)
    }

    /// Save under a new path, which becomes the document's path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.file_path = Some(path.to_path_buf());
        self.write_to(path)
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        match fs::write(path, &self.content) {
            Ok(()) => {
                self.dirty = false;
                info!("Saved {:?}", path);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save {:?}: {}", path, e);
                Err(e.into())
            }
        }
    }

    /// Keep the document's path in step with a rename of its file.
    pub fn follow_rename(&mut self, old_path: &Path, new_path: &Path) -> bool {
        if self.file_path.as_deref() == Some(old_path) {
            self.file_path = Some(new_path.to_path_buf());
            true
        } else {
            false
        }
    }

    /// Name shown for the document, e.g. in a title bar.
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Render the whole document for the editor's live preview: every slide
    /// in order, a marker before each slide after the first and its notes.
    pub fn preview_html(&self, renderer: &MarkdownRenderer) -> String {
        let base_path = self.base_path();
        let mut html = String::new();

        for (index, slide) in slides::from_document(&self.content).iter().enumerate() {
            if index > 0 {
                html.push_str(&format!(
                    "<div class=\"slide-separator\">Slide {}</div>",
                    index + 1
                ));
            }
            html.push_str(&renderer.render(&slide.content, base_path.as_deref()));
            if slide.has_notes() {
                html.push_str("<div class=\"speaker-notes\">");
                html.push_str(&renderer.render(&slide.notes, base_path.as_deref()));
                html.push_str("</div>");
            }
        }

        html
    }

    pub fn status(&self) -> StatusLine {
        StatusLine {
            file: if self.dirty {
                format!("{} (modified)", self.display_name())
            } else {
                self.display_name()
            },
            slides: slides::count(&self.content),
            words: self.content.split_whitespace().count(),
        }
    }
}

/// Editor status bar contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub file: String,
    pub slides: usize,
    pub words: usize,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.slides == 1 { "" } else { "s" };
        write!(
            f,
            "{} | {} slide{} | {} words",
            self.file, self.slides, plural, self.words
        )
    }
}
