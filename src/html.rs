// ABOUTME: HTML document generation for decks and live view pages
// ABOUTME: Builds the standalone slide deck used for export and the editor, audience and presenter pages

use crate::errors::Result;
use crate::frontmatter::{DeckSettings, Theme};
use crate::markdown::MarkdownRenderer;
use crate::resources::{self, ResourceMode, Stylesheet};
use crate::slides;
use crate::utils;
use crate::view::ViewRole;
use log::info;
use std::fs;
use std::path::Path;

const BASE_CSS: &str = r#"
:root { --bg: #ffffff; --fg: #1f2328; --muted: #6e7781; --accent: #0969da; --code-bg: #f6f8fa; }
.theme-dark { --bg: #1e1e1e; --fg: #d4d4d4; --muted: #808080; --accent: #569cd6; --code-bg: #2d2d2d; }
.theme-catppuccin { --bg: #1e1e2e; --fg: #cdd6f4; --muted: #7f849c; --accent: #cba6f7; --code-bg: #313244; }
.theme-nord { --bg: #2e3440; --fg: #eceff4; --muted: #7b88a1; --accent: #88c0d0; --code-bg: #3b4252; }
.theme-solarized { --bg: #fdf6e3; --fg: #657b83; --muted: #93a1a1; --accent: #268bd2; --code-bg: #eee8d5; }
.theme-light { --bg: #fafafa; --fg: #333333; --muted: #888888; --accent: #4078c0; --code-bg: #f0f0f0; }
body { margin: 0; background: var(--bg); color: var(--fg); font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; }
a { color: var(--accent); }
pre, code { background: var(--code-bg); border-radius: 4px; }
pre { padding: 1em; overflow: auto; }
.slide { box-sizing: border-box; width: 100vw; height: 100vh; padding: 4vh 6vw; display: flex; flex-direction: column; justify-content: center; overflow: hidden; }
.slide.title-slide { align-items: center; text-align: center; }
.slide img { max-width: 100%; max-height: 70vh; }
.slide-separator { margin: 2em 0 1em; padding-top: .5em; border-top: 1px dashed var(--muted); color: var(--muted); font-size: .8em; }
.speaker-notes { margin-top: 1em; padding: .5em 1em; border-left: 3px solid var(--accent); color: var(--muted); }
.counter, .timer { position: fixed; bottom: 1em; color: var(--muted); font-size: .9em; }
.counter { right: 1.5em; }
.timer { left: 1.5em; }
.end-of-presentation { color: var(--muted); font-style: italic; }
.presenter-view { display: grid; grid-template-columns: 3fr 2fr; grid-template-rows: 1fr 1fr; height: 100vh; gap: 1em; padding: 1em; box-sizing: border-box; }
.presenter-view section { border: 1px solid var(--muted); border-radius: 6px; padding: 1em; overflow: auto; }
.presenter-view #current-slide { grid-row: span 2; }
@media print { .slide { page-break-after: always; break-after: page; height: 100vh; } }
"#;

/// Render a whole document as a standalone deck: one `<section>` per
/// slide, themed from its frontmatter.
pub fn render_deck(
    content: &str,
    base_path: Option<&str>,
    renderer: &MarkdownRenderer,
    stylesheets: &[Stylesheet],
    mode: ResourceMode,
) -> String {
    let settings = DeckSettings::from_document(content);
    let slides = slides::from_document(content);
    info!("Rendering deck with {} slides", slides.len());

    let mut body = String::new();
    if slides.is_empty() {
        body.push_str("<section class=\"slide title-slide\"><h1>No slides</h1></section>\n");
    }
    for slide in &slides {
        let class = if slide.is_title_slide() {
            "slide title-slide"
        } else {
            "slide"
        };
        body.push_str(&format!(
            "<section class=\"{}\">\n{}</section>\n",
            class,
            renderer.render(&slide.content, base_path)
        ));
    }

    let title = slides
        .first()
        .and_then(|slide| slide.content.lines().find_map(|l| l.strip_prefix("# ")))
        .unwrap_or("Presentation");

    page(
        title,
        settings.theme.unwrap_or_default(),
        settings.font_size,
        &resources::stylesheet_tags(stylesheets, mode),
        &body,
        "",
    )
}

/// Page for the editor's full-document live preview. `styles` goes into
/// the `<head>` as is.
pub fn editor_page(preview_html: &str, styles: &str, ws_port: u16) -> String {
    let body = format!("<main id=\"preview\">{}</main>\n", preview_html);
    page(
        "Preview",
        Theme::default(),
        None,
        styles,
        &body,
        &client_script("preview", ws_port),
    )
}

/// Shell for an audience or presenter page; content arrives as frames.
pub fn view_page(role: ViewRole, styles: &str, ws_port: u16) -> String {
    let body = match role {
        ViewRole::Audience => concat!(
            "<section id=\"slide\" class=\"slide\"><div id=\"slide-content\"></div></section>\n",
            "<div id=\"slide-counter\" class=\"counter\"></div>\n"
        ),
        ViewRole::Presenter => concat!(
            "<div class=\"presenter-view\">\n",
            "<section id=\"current-slide\"><div class=\"slide-content\"></div></section>\n",
            "<section id=\"next-slide\"><div class=\"slide-content\"></div></section>\n",
            "<section id=\"notes\"><div id=\"notes-content\"></div></section>\n",
            "</div>\n",
            "<div id=\"elapsed-time\" class=\"timer\"></div>\n",
            "<div id=\"slide-counter\" class=\"counter\"></div>\n"
        ),
    };
    page(
        role.as_str(),
        Theme::default(),
        None,
        styles,
        body,
        &client_script(role.as_str(), ws_port),
    )
}

fn page(
    title: &str,
    theme: Theme,
    font_size: Option<u32>,
    head_extra: &str,
    body: &str,
    script: &str,
) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str(&format!("<style>{}</style>\n", BASE_CSS));
    if let Some(size) = font_size {
        html.push_str(&format!(
            "<style>.slide {{ font-size: {}px; }}</style>\n",
            size
        ));
    }
    html.push_str(head_extra);
    html.push_str("</head>\n");
    html.push_str(&format!("<body class=\"{}\">\n", theme.css_class()));
    html.push_str(body);
    html.push_str(script);
    html.push_str("</body>\n</html>\n");
    html
}

/// Browser side of a live page: announces its feed, applies incoming
/// frames and forwards navigation keys.
fn client_script(feed: &str, ws_port: u16) -> String {
    format!(
        r##"<script>
(function() {{
  const feed = "{feed}";
  const $ = (sel) => document.querySelector(sel);
  function apply(frame) {{
    if (feed === "preview") {{ $("#preview").innerHTML = frame.html; return; }}
    document.body.className = "theme-" + frame.theme;
    const target = feed === "audience" ? $("#slide-content") : $("#current-slide .slide-content");
    target.innerHTML = frame.slide_html;
    if (frame.font_size) target.style.fontSize = frame.font_size + "px";
    $("#slide-counter").textContent = frame.counter;
    if (feed === "audience") {{ $("#slide").classList.toggle("title-slide", frame.title_slide); return; }}
    $("#next-slide .slide-content").innerHTML = frame.next_html || "";
    $("#notes-content").innerHTML = frame.notes_html || "";
    $("#elapsed-time").textContent = frame.elapsed || "";
  }}
  function connect() {{
    const socket = new WebSocket("ws://" + location.hostname + ":{ws_port}");
    socket.onopen = () => socket.send(feed);
    socket.onmessage = (event) => apply(JSON.parse(event.data));
    socket.onclose = () => setTimeout(connect, 1000);
    window.vomitSocket = socket;
  }}
  const keys = {{ ArrowRight: "next", " ": "next", n: "next", N: "next", ArrowLeft: "prev", p: "prev", P: "prev", Home: "first", End: "last", r: "reset-timer", R: "reset-timer" }};
  document.addEventListener("keydown", (e) => {{
    if (feed === "preview" || !keys[e.key] || !window.vomitSocket) return;
    e.preventDefault();
    window.vomitSocket.send(keys[e.key]);
  }});
  connect();
}})();
</script>
"##,
        feed = feed,
        ws_port = ws_port
    )
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);
    utils::ensure_parent_directory_exists(output_path)?;
    fs::write(output_path, html_content)?;
    Ok(())
}
