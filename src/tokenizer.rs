//! Text and token estimation for machine views and HTML
//!
//! Heuristic only. Token counts use a fixed 4 characters per token ratio,
//! which approximates common LLM tokenizers without being exact for any model.
//! Keep the ratio stable: comparisons across runs depend on it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Characters per token for the estimation heuristic
pub const CHARS_PER_TOKEN: usize = 4;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(</(?:div|p|section|article|nav|header|footer|main|aside|h[1-6]|li|ul|ol|table|tr)\s*>|<(?:br|hr)\b[^>]*>)",
    )
    .unwrap()
});
static CHUNK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*(?i:chunk):\s*([a-z0-9-]+)\s*-->").unwrap());

/// Token savings of a machine view over its HTML counterpart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenSavings {
    /// HTML tokens minus machine-view tokens (negative when the view is larger)
    pub absolute_tokens: i64,
    pub percent_saved: f64,
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Estimate LLM tokens: whitespace collapsed, then ceil(chars / 4)
pub fn estimate_tokens(text: &str) -> usize {
    let normalized = collapse_whitespace(text);
    normalized.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Reduce HTML to the plain text a naive scraping agent would see.
///
/// Script and style blocks go with their content and comments are dropped,
/// leaving no gap. Every remaining tag becomes a single space so words on
/// either side of a tag boundary stay apart. Only the six common named entities are decoded.
pub fn strip_html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = COMMENT.replace_all(&text, "");
    let text = TAG.replace_all(&text, " ");

    // &amp; last, so "&amp;lt;" decodes to "&lt;" and not "<"
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    collapse_whitespace(&text)
}

/// Estimate tokens for HTML as an agent receives it: comments and blank lines
/// removed, structural tags kept.
pub fn estimate_html_tokens(html: &str) -> usize {
    let text = COMMENT.replace_all(html, "");
    let text = BLANK_LINES.replace_all(&text, "\n");
    estimate_tokens(&text)
}

/// Savings of `machine_view_tokens` relative to `html_tokens`.
/// Percent is 0 when there are no HTML tokens.
pub fn calculate_savings(machine_view_tokens: usize, html_tokens: usize) -> TokenSavings {
    let absolute_tokens = html_tokens as i64 - machine_view_tokens as i64;
    let percent_saved = if html_tokens > 0 {
        absolute_tokens as f64 * 100.0 / html_tokens as f64
    } else {
        0.0
    };

    TokenSavings {
        absolute_tokens,
        percent_saved,
    }
}

/// Chunk IDs from `<!-- chunk: <id> -->` markers, in document order, duplicates kept
pub fn extract_chunk_ids(markdown: &str) -> Vec<String> {
    CHUNK_MARKER
        .captures_iter(markdown)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Line count of a machine view
pub fn count_lines(text: &str) -> usize {
    text.lines().count()
}

/// Non-blank line count of HTML after breaking lines at block boundaries.
///
/// Minified HTML would otherwise count as a single line.
pub fn count_html_lines(html: &str) -> usize {
    BLOCK_CLOSE
        .replace_all(html, "$1\n")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}
