// ABOUTME: Slide splitting for presentation documents
// ABOUTME: Divides a markdown body into ordered slides with optional speaker notes

use crate::frontmatter;
use serde::Serialize;

/// Line that separates two slides.
pub const SLIDE_SEPARATOR: &str = "\n---\n";

/// Line that separates visible slide content from speaker notes.
pub const NOTES_SEPARATOR: &str = "\n???\n";

/// One slide of a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Slide {
    pub content: String,
    pub notes: String,
}

impl Slide {
    pub fn new(content: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            notes: notes.into(),
        }
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }

    /// A slide made only of headings, starting with a level-one heading.
    pub fn is_title_slide(&self) -> bool {
        let starts_with_h1 = self.content.starts_with('#')
            && self.content[1..].chars().next().is_some_and(|c| c != '#');
        starts_with_h1
            && self
                .content
                .lines()
                .all(|line| line.is_empty() || line.starts_with('#'))
    }
}

/// Split a frontmatter-free body into slides.
///
/// Segments that are blank after trimming are dropped, so leading or
/// trailing separators never produce phantom slides.
pub fn split(body: &str) -> Vec<Slide> {
    let body = body.replace("\r\n", "\n");
    body.split(SLIDE_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(split_notes)
        .collect()
}

/// Strip frontmatter from a whole document and split the rest.
pub fn from_document(document: &str) -> Vec<Slide> {
    split(frontmatter::body(document))
}

/// Number of slides in a whole document.
pub fn count(document: &str) -> usize {
    from_document(document).len()
}

fn split_notes(segment: &str) -> Slide {
    match segment.split_once(NOTES_SEPARATOR) {
        Some((content, notes)) => Slide::new(content.trim(), notes.trim()),
        None => Slide::new(segment.trim(), ""),
    }
}
