// ABOUTME: Library module for the vomit program.
// ABOUTME: Contains the slide pipeline, synchronized presentation views, export and the live server.

// Reexport modules
pub mod assets;
pub mod config;
pub mod document;
pub mod emoji;
pub mod errors;
pub mod frontmatter;
pub mod html;
pub mod markdown;
pub mod outline;
pub mod pdf;
pub mod presentation;
pub mod resources;
pub mod server;
pub mod slides;
pub mod sync;
pub mod utils;
pub mod view;
pub mod watch;
pub mod workspace;

// Reexport common types and functions
pub use config::{Config, ServeConfig};
pub use document::{Document, StatusLine};
pub use errors::{Result, VomitError};
pub use frontmatter::{DeckSettings, Theme};
pub use html::{render_deck, write_html_to_file};
pub use markdown::{Backend, MarkdownRenderer};
pub use outline::{OutlineItem, OutlineKind};
pub use pdf::{export_pdf, ExportConfig};
pub use presentation::{Direction, Presentation};
pub use resources::{ResourceMode, Stylesheet};
pub use slides::Slide;
pub use sync::{Command, SyncCoordinator, ViewChannel};
pub use view::{FrameSink, PresentationView, ViewFrame, ViewMessage, ViewRole};
pub use watch::{watch_markdown, WatchConfig};
