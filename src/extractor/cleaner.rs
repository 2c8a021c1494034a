use ammonia::Builder;
use scraper::{ElementRef, Html, node::Node};
use std::collections::HashSet;

use crate::extractor::model::normalize_whitespace;

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "aside", "blockquote", "pre",
    "ul", "ol", "li", "table", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "figure", "figcaption",
    "br", "hr", "dd", "dt",
];

const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "iframe"];

/// Strip scripts, styles, forms and every other element a reader view has no
/// use for. Link targets are dropped because only text survives extraction.
pub fn sanitize(html: &str) -> String {
    let allowed: HashSet<&str> = [
        "p", "div", "section", "article", "blockquote", "pre", "code", "ul", "ol", "li", "table",
        "thead", "tbody", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "em", "strong",
        "b", "i", "a", "span", "br", "hr", "figure", "figcaption", "dl", "dd", "dt",
    ]
    .into_iter()
    .collect();

    Builder::default()
        .tags(allowed)
        .link_rel(None)
        .url_schemes(HashSet::new())
        .clean(html)
        .to_string()
}

/// Flatten an HTML fragment to text, starting a new line at block boundaries.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    push_text(fragment.root_element(), &mut out);
    normalize_whitespace(&out)
}

/// Visible text of an element with block-aware line breaks.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    normalize_whitespace(&out)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if INVISIBLE_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push_str("\n\n");
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_text(child_el, out);
                }
                if block {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
}
