use scraper::{ElementRef, Html, Selector, node::Node};
use std::sync::LazyLock;
use url::Url;

use crate::extractor::{
    chain::Heuristic,
    cleaner::element_text,
    dom::selector,
    model::{ExtractionMiss, normalize_whitespace},
};

static CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    selector(
        r#"article, main, [role="main"], [class*="content"], [id*="content"], [class*="article"], [id*="article"], [class*="story"], [class*="entry"], [class*="post-body"]"#,
    )
});

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title", "svg"];

/// Last resort: the largest content-bearing container (`article`, or a class
/// or id mentioning content), else every visible string on the page. A
/// container that holds only a sliver of the page loses to the page text.
pub struct StructuralFallback;

impl Heuristic for StructuralFallback {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn extract(&self, html: &str, _url: &Url) -> Result<String, ExtractionMiss> {
        let document = Html::parse_document(html);

        let container = document
            .select(&CONTAINERS)
            .map(element_text)
            .max_by_key(|text| text.chars().count())
            .filter(|text| !text.is_empty());
        let page = visible_text(document.root_element());

        let text = match container {
            Some(container) if !is_thin(&container, &page) => container,
            _ => page,
        };
        if text.is_empty() {
            return Err(ExtractionMiss::NoContent);
        }
        Ok(text)
    }
}

/// A container holding less than half of the page's visible text is a
/// widget (tag chips, teasers) rather than the article.
fn is_thin(container: &str, page: &str) -> bool {
    container.chars().count() * 2 < page.chars().count()
}

/// Every visible text node, trimmed and joined with single spaces.
pub fn visible_text(root: ElementRef<'_>) -> String {
    let strings: Vec<&str> = root
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, &**text)),
            _ => None,
        })
        .filter(|(node, _)| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
            })
        })
        .map(|(_, text)| text.trim())
        .filter(|text| !text.is_empty())
        .collect();
    normalize_whitespace(&strings.join(" "))
}
