// ABOUTME: Stylesheet resources for exported and served decks
// ABOUTME: Loads local or remote CSS and emits embedded or linked style tags

use crate::errors::{Result, VomitError};
use log::{info, warn};
use reqwest::blocking::Client;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const FETCH_ATTEMPTS: u32 = 3;

/// Whether a stylesheet's content is inlined or referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceMode {
    #[default]
    Embed,
    Link,
}

impl FromStr for ResourceMode {
    type Err = VomitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "embed" => Ok(ResourceMode::Embed),
            "link" => Ok(ResourceMode::Link),
            other => Err(VomitError::ConfigError(format!(
                "Unknown resource mode '{}', expected 'embed' or 'link'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetSource {
    Local(PathBuf),
    Remote(String),
}

/// Extra CSS applied on top of the built-in deck theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub source: StylesheetSource,
}

impl Stylesheet {
    /// `http(s)://` locations are remote, everything else is a local path.
    pub fn new(location: &str) -> Self {
        let source = if location.starts_with("http://") || location.starts_with("https://") {
            StylesheetSource::Remote(location.to_string())
        } else {
            StylesheetSource::Local(PathBuf::from(location))
        };
        Self { source }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.source, StylesheetSource::Remote(_))
    }

    pub fn location(&self) -> String {
        match &self.source {
            StylesheetSource::Local(path) => path.to_string_lossy().into_owned(),
            StylesheetSource::Remote(url) => url.clone(),
        }
    }

    pub fn load(&self) -> Result<String> {
        match &self.source {
            StylesheetSource::Local(path) => {
                info!("Reading local stylesheet: {:?}", path);
                if !path.exists() {
                    return Err(VomitError::PathNotFoundError(path.clone()));
                }
                Ok(fs::read_to_string(path)?)
            }
            StylesheetSource::Remote(url) => fetch(url),
        }
    }

    /// HTML for the `<head>`: remote sheets and link mode produce a
    /// `<link>`, local sheets in embed mode are inlined.
    pub fn tag(&self, mode: ResourceMode) -> Result<String> {
        if self.is_remote() || mode == ResourceMode::Link {
            return Ok(format!(
                r#"<link rel="stylesheet" href="{}">"#,
                self.location()
            ));
        }
        Ok(format!("<style>{}</style>", self.load()?))
    }
}

/// Fetch remote CSS with exponential backoff between attempts.
fn fetch(url: &str) -> Result<String> {
    info!("Fetching remote stylesheet: {}", url);
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

    let mut delay = Duration::from_millis(500);
    let mut last_error = None;
    for attempt in 1..=FETCH_ATTEMPTS {
        match client.get(url).send().and_then(|r| r.error_for_status()) {
            Ok(response) => return Ok(response.text()?),
            Err(e) => {
                warn!("Fetch attempt {} for {} failed: {}", attempt, url, e);
                last_error = Some(e);
            }
        }
        if attempt < FETCH_ATTEMPTS {
            std::thread::sleep(delay);
            delay *= 2;
        }
    }

    Err(last_error
        .map(VomitError::FetchError)
        .unwrap_or_else(|| VomitError::InvalidResourcePath(url.to_string())))
}

/// Tags for every stylesheet, skipping (and logging) the ones that fail.
pub fn stylesheet_tags(stylesheets: &[Stylesheet], mode: ResourceMode) -> String {
    let mut tags = String::new();
    for sheet in stylesheets {
        match sheet.tag(mode) {
            Ok(tag) => {
                tags.push_str(&tag);
                tags.push('\n');
            }
            Err(e) => warn!(
                "Failed to include stylesheet {}: {}",
                sheet.location(),
                e
            ),
        }
    }
    tags
}
