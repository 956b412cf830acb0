// ABOUTME: Error types for the vomit presentation core
// ABOUTME: Provides structured error handling for file, render, export and sync failures

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VomitError {
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Invalid resource path: {0}")]
    InvalidResourcePath(String),

    #[error("Headless browser error: {message}")]
    BrowserError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("PDF export error: {0}")]
    ExportError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {}", .0.display())]
    PathNotFoundError(PathBuf),

    #[error("A file with that name already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Document has no file path")]
    Untitled,

    #[error("Invalid image data: {0}")]
    ImageDataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Sync channel closed: {0}")]
    ChannelClosed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<base64::DecodeError> for VomitError {
    fn from(err: base64::DecodeError) -> Self {
        VomitError::ImageDataError(err.to_string())
    }
}

impl From<notify::Error> for VomitError {
    fn from(err: notify::Error) -> Self {
        VomitError::WatchError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VomitError>;
