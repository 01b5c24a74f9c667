//! Rich-text markup to plain text.

use ego_tree::iter::Edge;
use scraper::{Html, Node};

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "br", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "ul", "ol",
    "tr",
];

/// Convert rich-text markup to plain text.
///
/// Block elements end a line; whitespace inside each line collapses to single
/// spaces and blank lines are dropped.
#[must_use]
pub fn to_plain_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut raw = String::with_capacity(markup.len());

    for edge in fragment.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(text) => raw.push_str(text),
                Node::Element(element) if element.name() == "br" => raw.push('\n'),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(element) = node.value()
                    && element.name() != "br"
                    && BLOCK_ELEMENTS.contains(&element.name())
                {
                    raw.push('\n');
                }
            }
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
