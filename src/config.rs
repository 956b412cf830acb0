// ABOUTME: Configuration module for the vomit application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::errors::{Result, VomitError};
use crate::pdf::ExportConfig;
use crate::resources::{ResourceMode, Stylesheet};
use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3030;
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_SETTLE_MS: u64 = 1000;
const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub browser_path: Option<String>,
    pub port: u16,
    pub debounce_ms: u64,
    pub pdf_settle_ms: u64,
    pub default_timeout_ms: u64,
    pub embed_resources: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_path: env::var("BROWSER_PATH").ok(),
            port: DEFAULT_PORT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            pdf_settle_ms: DEFAULT_SETTLE_MS,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            embed_resources: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let embed_resources = env::var("VOMIT_EMBED_RESOURCES")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            browser_path: env::var("BROWSER_PATH").ok(),
            port: env_parse("VOMIT_PORT").unwrap_or(DEFAULT_PORT),
            debounce_ms: env_parse("VOMIT_DEBOUNCE_MS").unwrap_or(DEFAULT_DEBOUNCE_MS),
            pdf_settle_ms: env_parse("VOMIT_PDF_SETTLE_MS").unwrap_or(DEFAULT_SETTLE_MS),
            default_timeout_ms: env_parse("VOMIT_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS),
            embed_resources,
        }
    }

    /// Stylesheet handling unless a command overrides it.
    pub fn resource_mode(&self) -> ResourceMode {
        if self.embed_resources {
            ResourceMode::Embed
        } else {
            ResourceMode::Link
        }
    }

    /// Get a PDF export configuration with defaults from this config
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            settle_ms: self.pdf_settle_ms,
            timeout_ms: self.default_timeout_ms,
            browser_path: self.browser_path.clone(),
            ..ExportConfig::default()
        }
    }

    /// Get a live server configuration for one markdown file. The WebSocket
    /// listens on the port after the HTTP one.
    pub fn serve_config(
        &self,
        markdown_path: PathBuf,
        presenter: bool,
        port: Option<u16>,
        stylesheets: Vec<Stylesheet>,
    ) -> Result<ServeConfig> {
        let port = port.unwrap_or(self.port);
        let ws_port = port.checked_add(1).ok_or_else(|| {
            VomitError::ConfigError(format!(
                "Port {} leaves no room for the WebSocket port after it",
                port
            ))
        })?;
        Ok(ServeConfig {
            markdown_path,
            port,
            ws_port,
            presenter,
            debounce_ms: self.debounce_ms,
            stylesheets,
            mode: self.resource_mode(),
        })
    }
}

/// Configuration for `vomit present`
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Markdown file being presented and watched
    pub markdown_path: PathBuf,

    /// HTTP port for the pages
    pub port: u16,

    /// WebSocket port for the live channel
    pub ws_port: u16,

    /// Whether a presenter view runs alongside the audience view
    pub presenter: bool,

    /// Debounce time in milliseconds
    pub debounce_ms: u64,

    pub stylesheets: Vec<Stylesheet>,
    pub mode: ResourceMode,
}
