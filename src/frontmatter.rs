// ABOUTME: Frontmatter parsing for presentation documents
// ABOUTME: Extracts the leading `---` key/value block and applies deck settings from it

use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const DELIMITER: &str = "---";

pub const MIN_FONT_SIZE: u32 = 6;
pub const MAX_FONT_SIZE: u32 = 72;

/// Key/value settings taken from the frontmatter block.
pub type Frontmatter = HashMap<String, String>;

/// Split a document into its frontmatter settings and the remaining body.
///
/// A document without a closing delimiter is treated as having no
/// frontmatter at all, so nothing is lost from the body.
pub fn parse(document: &str) -> (Frontmatter, &str) {
    if !document.starts_with(DELIMITER) {
        return (Frontmatter::new(), document);
    }

    let Some(offset) = document[DELIMITER.len()..].find(DELIMITER) else {
        debug!("Frontmatter has no closing delimiter, treating document as body");
        return (Frontmatter::new(), document);
    };
    let end = DELIMITER.len() + offset;

    let mut settings = Frontmatter::new();
    for line in document[DELIMITER.len()..end].lines() {
        if let Some((key, value)) = line.split_once(':') {
            settings.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    let body = document[end + DELIMITER.len()..].trim_start();
    (settings, body)
}

/// Strip the frontmatter block and return only the body.
pub fn body(document: &str) -> &str {
    parse(document).1
}

/// Color theme a deck can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Catppuccin,
    Nord,
    Solarized,
    Light,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Default,
        Theme::Dark,
        Theme::Catppuccin,
        Theme::Nord,
        Theme::Solarized,
        Theme::Light,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Catppuccin => "catppuccin",
            Theme::Nord => "nord",
            Theme::Solarized => "solarized",
            Theme::Light => "light",
        }
    }

    /// CSS class applied to the body of a rendered view.
    pub fn css_class(self) -> String {
        format!("theme-{}", self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == wanted)
            .ok_or_else(|| format!("unknown theme: {}", s))
    }
}

/// Presentation settings derived from a frontmatter map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeckSettings {
    pub theme: Option<Theme>,
    pub font_size: Option<u32>,
}

impl DeckSettings {
    /// Apply recognised keys. Unknown keys and unusable values are ignored.
    pub fn from_frontmatter(frontmatter: &Frontmatter) -> Self {
        let theme = frontmatter.get("theme").and_then(|value| match value.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                debug!("Ignoring frontmatter theme: {}", e);
                None
            }
        });

        let font_size = frontmatter
            .get("font-size")
            .or_else(|| frontmatter.get("fontSize"))
            .and_then(|value| parse_font_size(value));

        Self { theme, font_size }
    }

    /// Parse the frontmatter of a whole document and apply it.
    pub fn from_document(document: &str) -> Self {
        Self::from_frontmatter(&parse(document).0)
    }
}

/// Leading-integer parse, so `20px` reads as 20, then clamped to the
/// supported range. Negative and overflowing values clamp to the bounds.
fn parse_font_size(value: &str) -> Option<u32> {
    let value = value.trim();
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let digits: String = unsigned
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    if negative {
        return Some(MIN_FONT_SIZE);
    }
    let size = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(size.clamp(MIN_FONT_SIZE as u64, MAX_FONT_SIZE as u64) as u32)
}
