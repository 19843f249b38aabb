//! Page markup stripping.
//!
//! Page content arrives as HTML. Sentence timing only works on plain text, so
//! markup is removed here before anything reaches the segmenter.

use html2text::render::TrivialDecorator;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Wide enough that html2text never inserts its own hard line breaks.
const RENDER_WIDTH: usize = 10_000;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([,.;:!?])").unwrap());

/// Render without decoration: link text only (no `[..][n]` references or
/// footnote lines), no emphasis markers, no heading or list prefixes.
fn render_plain(html: &str) -> Result<String, html2text::Error> {
    html2text::config::with_decorator(TrivialDecorator::new())
        .raw_mode(true)
        .string_from_read(html.as_bytes(), RENDER_WIDTH)
}

/// Convert page HTML into a single line of NFC-normalized plain text.
pub fn strip_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let plain = match render_plain(html) {
        Ok(clean) => clean,
        Err(err) => {
            warn!("html2text failed, stripping tags directly: {err}");
            RE_TAG.replace_all(html, " ").to_string()
        }
    };

    let normalized: String = plain.nfc().collect();
    let collapsed = RE_WS.replace_all(&normalized, " ");
    let collapsed = RE_SPACE_BEFORE_PUNCT
        .replace_all(&collapsed, "$1")
        .trim()
        .to_string();
    debug!(
        html_chars = html.len(),
        text_chars = collapsed.len(),
        "Stripped page markup"
    );
    collapsed
}

#[cfg(test)]
mod tests {
    use super::strip_html;
    use crate::timeline::build_timeline;

    #[test]
    fn removes_markup_and_collapses_whitespace() {
        let text = strip_html("<p>Hello   <em>world</em>.</p>\n<p>Second\nline!</p>");
        assert!(!text.contains('<'));
        assert!(text.contains("Hello"));
        assert!(text.contains("world"));
        assert!(text.contains("Second line!"));
        assert!(!text.contains('\n'));
        assert!(!text.contains("  "));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_html("Just words here."), "Just words here.");
    }

    #[test]
    fn blank_markup_is_empty() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("   \n "), "");
    }

    #[test]
    fn composes_decomposed_characters() {
        assert_eq!(strip_html("Cafe\u{301} noir."), "Caf\u{e9} noir.");
    }

    #[test]
    fn links_and_emphasis_leave_only_their_text() {
        let text = strip_html(
            r#"<p>Read <a href="https://example.com/a/very/long/path">the guide</a> now.</p><p>Then <strong>stop</strong>.</p>"#,
        );
        assert_eq!(text, "Read the guide now. Then stop.");

        let sentences = build_timeline(&text, 10.0);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Read the guide now.");
        assert_eq!(sentences[1].word_count, 2);
    }

    #[test]
    fn headings_lists_and_quotes_have_no_prefixes() {
        let text = strip_html(
            "<h1>Title</h1><h3>Part <em>one</em></h3><ul><li>First item.</li></ul><blockquote>Quoted line.</blockquote>",
        );
        assert_eq!(text, "Title Part one First item. Quoted line.");
        assert!(!text.contains('#'));
        assert!(!text.contains('*'));
        assert!(!text.contains('>'));
    }

    #[test]
    fn inline_code_and_footnote_links_are_plain() {
        let text = strip_html(
            r##"<p>Call <code>run</code> twice<a href="#fn1"><sup>1</sup></a>.</p>"##,
        );
        assert!(!text.contains('`'));
        assert!(!text.contains('['));
        assert!(!text.contains("#fn1"));
        assert!(text.starts_with("Call run twice"));
        assert!(text.ends_with('.'));
    }
}
