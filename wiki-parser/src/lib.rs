//! Extract readable paragraph text from rendered Wikipedia article HTML.
//!
//! The MediaWiki `parse` API returns the article body as an HTML fragment. This
//! crate keeps only the prose: every `<p>` outside of tables, figures and other
//! non-content elements is flattened to single-spaced text, bracketed citation
//! markers such as `[12]` are removed, and paragraphs are joined with newlines.

use std::borrow::Cow;
use std::sync::OnceLock;

use ego_tree::NodeRef;
use html_escape::decode_html_entities;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html, Selector};

/// Elements whose whole subtree is dropped before paragraphs are read.
pub const IGNORE_TAGS: &[&str] = &["table", "script", "style", "math", "sup", "img", "figure"];

/// Elements that separate words; a space is emitted on either side of them.
/// Inline elements such as `<b>` or `<a>` join their text without one.
pub const BREAK_TAGS: &[&str] = &["br", "div", "li", "dd", "dt", "blockquote"];

/// Extracts cleaned paragraphs from a Wikipedia HTML document or fragment.
///
/// # Example
///
/// ```
/// use wiki_parser::extract_paragraphs;
///
/// let html = r#"<div class="mw-parser-output"><p>Hello <sup>[1]</sup>world.</p></div>"#;
/// assert_eq!(extract_paragraphs(html), vec!["Hello world.".to_string()]);
/// ```
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").expect("valid selector for paragraphs");

    let mut paragraphs = Vec::new();
    for node in document.select(&selector) {
        if has_ignored_ancestor(&node) {
            continue;
        }
        let mut buf = String::new();
        collect_text(&node, &mut buf);
        let cleaned = clean_paragraph(&buf);
        if !cleaned.is_empty() {
            paragraphs.push(cleaned);
        }
    }
    paragraphs
}

/// Extracts the article prose as newline-separated paragraphs.
///
/// # Example
///
/// ```
/// use wiki_parser::extract_text;
///
/// let html = "<p>First [1] part.</p><table><tr><td><p>skip</p></td></tr></table><p>Second.</p>";
/// assert_eq!(extract_text(html), "First part.\nSecond.");
/// ```
pub fn extract_text(html: &str) -> String {
    extract_paragraphs(html).join("\n").trim().to_string()
}

/// Removes numeric citation markers (`[1]`, `[23]`) from plain text.
pub fn strip_citations(text: &str) -> Cow<'_, str> {
    citation_pattern().replace_all(text, "")
}

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

fn clean_paragraph(raw: &str) -> String {
    let decoded = decode_html_entities(raw);
    let stripped = strip_citations(&decoded);
    normalize_whitespace(&stripped)
}

fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[[0-9]+\]").expect("valid citation pattern"))
}

fn collect_text(node: &NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) if should_ignore_element(element) => {}
        Node::Element(element) if BREAK_TAGS.contains(&element.name()) => {
            out.push(' ');
            for child in node.children() {
                collect_text(&child, out);
            }
            out.push(' ');
        }
        _ => {
            for child in node.children() {
                collect_text(&child, out);
            }
        }
    }
}

fn should_ignore_element(element: &scraper::node::Element) -> bool {
    IGNORE_TAGS.contains(&element.name())
}

fn has_ignored_ancestor(node: &ElementRef<'_>) -> bool {
    node.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| should_ignore_element(ancestor.value()))
}
