// ABOUTME: Markdown to HTML rendering for a single slide
// ABOUTME: Wraps comrak with asset resolution, emoji shortcodes and a lossy regex fallback

use crate::assets;
use crate::emoji;
use regex::Regex;
use std::sync::OnceLock;

/// Which engine turns markdown into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Full CommonMark + GFM extensions through comrak.
    #[cfg(feature = "comrak")]
    Comrak,
    /// Minimal regex substitution, used when comrak is not compiled in.
    Fallback,
}

impl Backend {
    /// The best backend this build provides.
    pub fn available() -> Self {
        #[cfg(feature = "comrak")]
        {
            Backend::Comrak
        }
        #[cfg(not(feature = "comrak"))]
        {
            log::debug!("comrak not compiled in, using fallback markdown renderer");
            Backend::Fallback
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::available()
    }
}

/// Renders slide markdown into HTML ready to inject into a view.
///
/// The output is not sanitized: the input is the local file being edited.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    pub backend: Backend,
    pub emoji: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            backend: Backend::available(),
            emoji: true,
        }
    }
}

impl MarkdownRenderer {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn with_emoji(mut self, emoji: bool) -> Self {
        self.emoji = emoji;
        self
    }

    /// Render one slide's markdown, resolving images against `base_path`.
    pub fn render(&self, text: &str, base_path: Option<&str>) -> String {
        let text = if self.emoji {
            emoji::replace_shortcodes(text)
        } else {
            text.to_string()
        };
        let processed = assets::resolve(&text, base_path);

        match self.backend {
            #[cfg(feature = "comrak")]
            Backend::Comrak => render_comrak(&processed),
            Backend::Fallback => render_fallback(&processed),
        }
    }
}

/// Render with the default renderer.
pub fn render(text: &str, base_path: Option<&str>) -> String {
    MarkdownRenderer::default().render(text, base_path)
}

#[cfg(feature = "comrak")]
fn render_comrak(text: &str) -> String {
    use comrak::{markdown_to_html, ComrakOptions};

    let mut options = ComrakOptions::default();
    options.render.unsafe_ = true; // sized images arrive as raw <img>
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    markdown_to_html(text, &options)
}

/// Lossy regex rendering: headings, bold, italic, inline code, flat list
/// items and paragraph breaks. No nesting, tables or links.
pub fn render_fallback(text: &str) -> String {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    let rules = RULES.get_or_init(|| {
        [
            (r"(?m)^### (.*)$", "<h3>$1</h3>"),
            (r"(?m)^## (.*)$", "<h2>$1</h2>"),
            (r"(?m)^# (.*)$", "<h1>$1</h1>"),
            (r"\*\*(.*?)\*\*", "<strong>$1</strong>"),
            (r"\*(.*?)\*", "<em>$1</em>"),
            (r"`(.*?)`", "<code>$1</code>"),
            (r"(?m)^- (.*)$", "<li>$1</li>"),
            (r"\n\n", "</p><p>"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
        .collect()
    });

    rules
        .iter()
        .fold(text.to_string(), |html, (re, replacement)| {
            re.replace_all(&html, *replacement).into_owned()
        })
}
