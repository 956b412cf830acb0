// ABOUTME: PDF export of a presentation through a headless browser
// ABOUTME: Loads the rendered deck in Chrome, waits a fixed settle delay and prints it to PDF

use crate::errors::{Result, VomitError};
use crate::html;
use crate::markdown::MarkdownRenderer;
use crate::resources::{ResourceMode, Stylesheet};
use crate::utils;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptionsBuilder};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A4 in inches; Chrome rotates it for landscape.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Configuration for PDF export
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    /// Fixed wait after loading the deck; the page gives no completion signal.
    pub settle_ms: u64,
    pub timeout_ms: u64,
    pub browser_path: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            settle_ms: 1000,
            timeout_ms: 30000,
            browser_path: None,
        }
    }
}

/// Print options: background graphics, landscape A4, no margins.
pub fn print_options() -> PrintToPdfOptions {
    PrintToPdfOptions {
        landscape: Some(true),
        print_background: Some(true),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        margin_top: Some(0.0),
        margin_bottom: Some(0.0),
        margin_left: Some(0.0),
        margin_right: Some(0.0),
        ..Default::default()
    }
}

fn browser_error(context: &str, err: impl std::fmt::Display) -> VomitError {
    VomitError::BrowserError {
        message: format!("{}: {}", context, err),
        source: None,
    }
}

/// Render `content` and print it to PDF bytes. Writing them is up to the
/// caller.
pub fn export_pdf(
    content: &str,
    base_path: Option<&str>,
    renderer: &MarkdownRenderer,
    stylesheets: &[Stylesheet],
    config: &ExportConfig,
) -> Result<Vec<u8>> {
    if content.trim().is_empty() {
        return Err(VomitError::ExportError(
            "Nothing to export, the document is empty".to_string(),
        ));
    }

    let deck = html::render_deck(
        content,
        base_path,
        renderer,
        stylesheets,
        ResourceMode::Embed,
    );
    let deck_path =
        std::env::temp_dir().join(format!("vomit-export-{}.html", uuid::Uuid::new_v4()));
    fs::write(&deck_path, deck)?;

    let result = print_file(&deck_path, config);

    if let Err(e) = fs::remove_file(&deck_path) {
        warn!("Failed to clean up {:?}: {}", deck_path, e);
    }
    result
}

fn print_file(deck_path: &Path, config: &ExportConfig) -> Result<Vec<u8>> {
    let mut launch_options_builder = LaunchOptionsBuilder::default();
    launch_options_builder.window_size(Some((config.width, config.height)));
    launch_options_builder.headless(true);
    if let Some(browser_path) = &config.browser_path {
        launch_options_builder.path(Some(PathBuf::from(browser_path)));
    }

    let launch_options = launch_options_builder
        .build()
        .map_err(|e| browser_error("Failed to build browser options", e))?;

    info!("Launching headless browser for PDF export");
    let browser =
        Browser::new(launch_options).map_err(|e| browser_error("Failed to launch browser", e))?;
    let tab = browser
        .new_tab()
        .map_err(|e| browser_error("Failed to create new tab", e))?;

    let url = url::Url::from_file_path(deck_path).map_err(|_| {
        VomitError::ExportError(format!("Deck path is not absolute: {:?}", deck_path))
    })?;
    info!("Opening deck at {}", url);

    tab.navigate_to(url.as_str())
        .map_err(|e| browser_error("Failed to navigate to deck", e))?;
    tab.wait_until_navigated()
        .map_err(|e| browser_error("Navigation failed", e))?;
    tab.wait_for_element_with_custom_timeout("body", Duration::from_millis(config.timeout_ms))
        .map_err(|e| browser_error("Deck did not render", e))?;

    std::thread::sleep(Duration::from_millis(config.settle_ms));

    let bytes = tab
        .print_to_pdf(Some(print_options()))
        .map_err(|e| browser_error("Failed to print PDF", e))?;
    info!("Printed PDF ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Write exported PDF bytes, creating the parent directory if needed.
pub fn write_pdf(bytes: &[u8], output_path: &Path) -> Result<()> {
    utils::ensure_parent_directory_exists(output_path)?;
    fs::write(output_path, bytes)?;
    info!("PDF written to {:?}", output_path);
    Ok(())
}
