//! Small DOM helpers shared by the heuristics.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use crate::extractor::model::normalize_whitespace;

static CHROME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|[\s_-])(nav|navbar|menu|footer|header|masthead|sidebar|widget|comment|comments|share|sharing|social|cookie|consent|banner|advert|ad|ads|promo|related|recommended|subscribe|newsletter|breadcrumb|byline-share|popup|modal)([\s_-]|$)",
    )
    .unwrap()
});

const CHROME_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "form", "script", "style", "noscript", "template",
    "button", "select", "svg", "iframe",
];

pub static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a"));
pub static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| selector("p"));

/// Parse a selector literal. Only used with constants.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

/// Whether the element itself looks like page chrome by tag, class or id.
pub fn is_chrome(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if CHROME_TAGS.contains(&el.name()) {
        return true;
    }
    if matches!(el.attr("role"), Some("navigation" | "banner" | "contentinfo" | "complementary")) {
        return true;
    }
    let class = el.attr("class").unwrap_or_default();
    let id = el.id().unwrap_or_default();
    CHROME_PATTERN.is_match(class) || CHROME_PATTERN.is_match(id)
}

/// Whether the element or any ancestor is page chrome.
pub fn inside_chrome(element: ElementRef<'_>) -> bool {
    is_chrome(element) || element.ancestors().filter_map(ElementRef::wrap).any(is_chrome)
}

/// Flat, whitespace-collapsed text of an element.
pub fn flat_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Share of the element's characters that sit inside links.
pub fn link_density(element: ElementRef<'_>, text_len: usize) -> f64 {
    if text_len == 0 {
        return 0.0;
    }
    let link_len: usize = element
        .select(&LINKS)
        .map(|a| flat_text(a).chars().count())
        .sum();
    link_len as f64 / text_len as f64
}
