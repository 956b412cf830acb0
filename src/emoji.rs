// ABOUTME: Emoji shortcode substitution for slide markdown
// ABOUTME: Replaces `:name:` shortcodes with their unicode emoji, leaving unknown codes intact

use regex::{Captures, Regex};
use std::sync::OnceLock;

const SHORTCODES: &[(&str, &str)] = &[
    ("+1", "👍"),
    ("-1", "👎"),
    ("100", "💯"),
    ("bulb", "💡"),
    ("bug", "🐛"),
    ("calendar", "📅"),
    ("chart_with_upwards_trend", "📈"),
    ("check", "✔️"),
    ("clap", "👏"),
    ("coffee", "☕"),
    ("construction", "🚧"),
    ("rocket", "🚀"),
    ("fire", "🔥"),
    ("heart", "❤️"),
    ("smile", "😄"),
    ("grin", "😁"),
    ("joy", "😂"),
    ("wink", "😉"),
    ("thinking", "🤔"),
    ("tada", "🎉"),
    ("sparkles", "✨"),
    ("star", "⭐"),
    ("warning", "⚠️"),
    ("white_check_mark", "✅"),
    ("x", "❌"),
    ("question", "❓"),
    ("exclamation", "❗"),
    ("memo", "📝"),
    ("books", "📚"),
    ("book", "📖"),
    ("computer", "💻"),
    ("gear", "⚙️"),
    ("wrench", "🔧"),
    ("hammer", "🔨"),
    ("lock", "🔒"),
    ("key", "🔑"),
    ("mag", "🔍"),
    ("link", "🔗"),
    ("package", "📦"),
    ("point_right", "👉"),
    ("point_left", "👈"),
    ("wave", "👋"),
    ("eyes", "👀"),
    ("zap", "⚡"),
    ("boom", "💥"),
    ("trophy", "🏆"),
    ("dart", "🎯"),
    ("hourglass", "⌛"),
    ("crab", "🦀"),
    ("snake", "🐍"),
    ("whale", "🐳"),
    ("penguin", "🐧"),
];

/// Look up the emoji for a shortcode name (without colons).
pub fn lookup(name: &str) -> Option<&'static str> {
    SHORTCODES
        .iter()
        .find(|(code, _)| *code == name)
        .map(|(_, emoji)| *emoji)
}

/// Replace every known `:shortcode:` in `text`.
pub fn replace_shortcodes(text: &str) -> String {
    static SHORTCODE: OnceLock<Regex> = OnceLock::new();
    let re = SHORTCODE.get_or_init(|| Regex::new(r":([a-z0-9_+\-]+):").unwrap());

    re.replace_all(text, |caps: &Captures| match lookup(&caps[1]) {
        Some(emoji) => emoji.to_string(),
        None => caps[0].to_string(),
    })
    .into_owned()
}
