// ABOUTME: Presentation state machine for a single view
// ABOUTME: Holds the parsed slides and current index, and implements clamped navigation

use crate::frontmatter::{self, DeckSettings};
use crate::slides::{self, Slide};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
    First,
    Last,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Prev => "prev",
            Direction::First => "first",
            Direction::Last => "last",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "next" => Ok(Direction::Next),
            "prev" | "previous" => Ok(Direction::Prev),
            "first" => Ok(Direction::First),
            "last" => Ok(Direction::Last),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Slides and position for one view.
///
/// Every update re-parses the whole document; the index survives reloads
/// (clamped) so live edits don't move the audience.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    slides: Vec<Slide>,
    current: usize,
    base_path: Option<String>,
    settings: DeckSettings,
}

impl Presentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `content` and load it with the document's base path. `None`
    /// leaves relative assets unresolved.
    pub fn load(&mut self, content: &str, base_path: Option<&str>) {
        self.base_path = base_path.map(str::to_string);
        self.update(content);
    }

    /// Re-parse edited content, keeping the base path and the clamped position.
    pub fn update(&mut self, content: &str) {
        let (settings, body) = frontmatter::parse(content);
        self.settings = DeckSettings::from_frontmatter(&settings);
        self.slides = slides::split(body);
        self.current = self.current.min(self.slides.len().saturating_sub(1));

        debug!(
            "Loaded {} slides, current index {}",
            self.slides.len(),
            self.current
        );
    }

    /// Apply a relative navigation request.
    pub fn navigate(&mut self, direction: Direction) {
        match direction {
            Direction::Next => self.next(),
            Direction::Prev => self.prev(),
            Direction::First => self.first(),
            Direction::Last => self.last(),
        }
    }

    pub fn next(&mut self) {
        if self.current + 1 < self.slides.len() {
            self.current += 1;
        }
    }

    pub fn prev(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn first(&mut self) {
        self.current = 0;
    }

    pub fn last(&mut self) {
        self.current = self.slides.len().saturating_sub(1);
    }

    /// Jump to `index`. Out-of-range requests are ignored; returns whether
    /// the jump happened.
    pub fn goto(&mut self, index: i64) -> bool {
        match usize::try_from(index) {
            Ok(index) if index < self.slides.len() => {
                self.current = index;
                true
            }
            _ => {
                debug!(
                    "Ignoring goto({}) with {} slides",
                    index,
                    self.slides.len()
                );
                false
            }
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current)
    }

    pub fn next_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current + 1)
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.slides.len()
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn settings(&self) -> DeckSettings {
        self.settings
    }

    /// `"{n} / {total}"`, 1-based; `"0 / 0"` for an empty deck.
    pub fn counter(&self) -> String {
        if self.slides.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current + 1, self.slides.len())
        }
    }
}
