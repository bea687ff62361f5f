//! Content-type detection and plain-text conversion

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HTML_MARKER_REGEX: Regex =
        Regex::new(r"(?i)<html>|<!doctype|<div>|<p>|<h[1-6]>").unwrap();
    static ref LINE_BREAK_REGEX: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref PARAGRAPH_END_REGEX: Regex = Regex::new(r"(?i)</(p|h[1-6])>").unwrap();
    static ref BLOCK_END_REGEX: Regex = Regex::new(r"(?i)</div>").unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"(?s)<.*?>").unwrap();
    static ref BLANK_LINES_REGEX: Regex = Regex::new(r"\n\s*\n").unwrap();
}

const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Shallow check for common HTML markers (`<html>`, `<!DOCTYPE`, `<div>`, `<p>`, headings)
pub fn looks_like_html(content: &str) -> bool {
    HTML_MARKER_REGEX.is_match(content)
}

/// Plain-text rendition of an HTML body, for the text alternative
pub fn strip_html_tags(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let text = LINE_BREAK_REGEX.replace_all(html, "\n");
    let text = PARAGRAPH_END_REGEX.replace_all(&text, "\n\n");
    let text = BLOCK_END_REGEX.replace_all(&text, "\n");
    let text = TAG_REGEX.replace_all(&text, "");

    // &amp; last so that "&amp;lt;" decodes to "&lt;" and not "<"
    let text = ENTITIES
        .iter()
        .fold(text.into_owned(), |text, (entity, replacement)| {
            text.replace(entity, replacement)
        });

    BLANK_LINES_REGEX
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}
