//! HTML-to-plain-text reduction and snippet extraction.
//!
//! This is a best-effort, pattern-based reduction rather than a full HTML
//! parse: readable plain text is preferred over structural fidelity, and
//! malformed markup degrades to stray fragments instead of an error.

use regex::Regex;
use std::sync::LazyLock;

/// Block-level tags flanked by non-newline characters on both sides.
///
/// The leading `h` alternative matches any tag starting with `h` (headings,
/// `hr`), since the remainder of the tag is consumed by the non-greedy tail.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BLOCK_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)([^\n])</?(?:h|br|p|ul|ol|li|blockquote|section|table|tr|div).*?>([^\n])")
        .expect("valid regex")
});

/// Any remaining tag: open, close, or self-closing.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANY_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("valid regex"));

/// Reduce HTML markup to plain text.
///
/// Block-level tags (headings, `br`, `p`, `ul`, `ol`, `li`, `blockquote`,
/// `section`, `table`, `tr`, `div`) that sit between two non-newline
/// characters are replaced by a newline between those characters; every
/// remaining tag is deleted outright.
///
/// # Examples
/// ```
/// use feed_normalize::strip_html;
///
/// assert_eq!(strip_html("<p>a</p>b"), "a\nb");
/// assert_eq!(strip_html("plain text"), "plain text");
/// ```
#[must_use]
pub fn strip_html(markup: &str) -> String {
    let broken = BLOCK_TAG_PATTERN.replace_all(markup, "$1\n$2");
    ANY_TAG_PATTERN.replace_all(&broken, "").into_owned()
}

/// Produce a plain-text preview snippet from a content value.
///
/// Strips tags via [`strip_html`], decodes HTML character entities, and trims
/// surrounding whitespace. Idempotent on already-plain text.
///
/// # Examples
/// ```
/// use feed_normalize::get_snippet;
///
/// assert_eq!(get_snippet("<p>Hello &amp; welcome</p>"), "Hello & welcome");
/// ```
#[must_use]
pub fn get_snippet(value: &str) -> String {
    html_escape::decode_html_entities(&strip_html(value))
        .trim()
        .to_string()
}
