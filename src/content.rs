//! Plain-text cleanup for backend titles and snippets.
//!
//! Backends may return HTML-formatted text (highlight tags, entities).
//! Everything handed to callers is reduced to single-line plain text.

use scraper::Html;
use scraper::node::Node;

/// Elements that separate words even when the markup has no whitespace.
const BREAKING_ELEMENTS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "tr", "td", "th", "table", "h1", "h2", "h3", "h4", "h5",
    "h6", "blockquote", "pre", "hr", "dd", "dt", "section", "article", "header", "footer",
];

/// Reduce an HTML fragment to plain text.
///
/// Tags are dropped, entities decoded, and all whitespace runs collapsed
/// to single spaces. Line breaks and block-level elements separate words.
pub fn plain_text(fragment: &str) -> String {
    if !fragment.contains(|c: char| c == '<' || c == '&') {
        return collapse_whitespace(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    let mut text = String::with_capacity(fragment.len());
    for node in parsed.root_element().descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(element) if BREAKING_ELEMENTS.contains(&element.name()) => {
                text.push(' ');
            }
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

/// Collapse every whitespace run (newlines included) to one space and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
