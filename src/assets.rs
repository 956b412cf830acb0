// ABOUTME: Asset path resolution for slide markdown
// ABOUTME: Rewrites relative image references and the `=WxH` size syntax into view-addressable URIs

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Rewrite image references in `markdown` so a view can load them.
///
/// Sized images (`![alt](src =WxH)`) become raw `<img>` elements because the
/// markdown renderer has no size attributes. Plain images keep markdown
/// syntax. Relative sources are only rewritten when `base_path` is known.
pub fn resolve(markdown: &str, base_path: Option<&str>) -> String {
    static SIZED_IMAGE: OnceLock<Regex> = OnceLock::new();
    static PLAIN_IMAGE: OnceLock<Regex> = OnceLock::new();

    let sized = SIZED_IMAGE
        .get_or_init(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\s*=(\d*)x(\d*)\)").unwrap());
    let plain = PLAIN_IMAGE.get_or_init(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)").unwrap());

    let processed = sized.replace_all(markdown, |caps: &Captures| {
        let width = &caps[3];
        let height = &caps[4];
        if width.is_empty() && height.is_empty() {
            return caps[0].to_string();
        }

        let mut style = String::new();
        if !width.is_empty() {
            style.push_str(&format!("width:{}px;", width));
        }
        if !height.is_empty() {
            style.push_str(&format!("height:{}px;", height));
        }

        format!(
            r#"<img src="{}" alt="{}" style="{}">"#,
            resolve_src(&caps[2], base_path),
            &caps[1],
            style
        )
    });

    plain
        .replace_all(&processed, |caps: &Captures| {
            let src = &caps[2];
            if src.contains('=') {
                return caps[0].to_string();
            }
            format!("![{}]({})", &caps[1], resolve_src(src, base_path))
        })
        .into_owned()
}

/// Resolve a single image source against `base_path`.
pub fn resolve_src(src: &str, base_path: Option<&str>) -> String {
    match base_path {
        Some(base) if !is_absolute(src) => format!("file://{}/{}", base, src),
        _ => src.to_string(),
    }
}

/// Sources that already address a resource on their own.
pub fn is_absolute(src: &str) -> bool {
    src.starts_with("http") || src.starts_with("file://") || src.starts_with("data:")
}
