// ABOUTME: Outline extraction for the editor sidebar
// ABOUTME: Derives slide markers and h1-h3 headings with their source lines from a document

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineKind {
    Slide,
    H1,
    H2,
    H3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    #[serde(rename = "type")]
    pub kind: OutlineKind,
    pub text: String,
    /// Zero-based line in the source document.
    #[serde(rename = "sourceLine")]
    pub line: usize,
}

impl OutlineItem {
    fn new(kind: OutlineKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

/// Extract the outline of a document in source order.
///
/// The first slide has no marker; each separator emits `Slide {n}` for the
/// slide it opens, starting at 2. Lines inside a leading frontmatter block
/// are skipped.
pub fn extract(document: &str) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    let mut slide_number = 1;
    let mut in_frontmatter = false;

    for (index, line) in document.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let is_separator = line.trim() == "---";

        if index == 0 && is_separator {
            in_frontmatter = true;
            continue;
        }
        if in_frontmatter {
            if is_separator {
                in_frontmatter = false;
            }
            continue;
        }

        if is_separator {
            slide_number += 1;
            items.push(OutlineItem::new(
                OutlineKind::Slide,
                format!("Slide {}", slide_number),
                index,
            ));
        } else if let Some((kind, text)) = heading(line) {
            items.push(OutlineItem::new(kind, text, index));
        }
    }

    items
}

fn heading(line: &str) -> Option<(OutlineKind, &str)> {
    let (kind, text) = if let Some(text) = line.strip_prefix("### ") {
        (OutlineKind::H3, text)
    } else if let Some(text) = line.strip_prefix("## ") {
        (OutlineKind::H2, text)
    } else if let Some(text) = line.strip_prefix("# ") {
        (OutlineKind::H1, text)
    } else {
        return None;
    };

    (!text.is_empty()).then_some((kind, text))
}
