use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

use crate::extractor::{
    chain::Heuristic,
    cleaner::html_to_text,
    dom::{PARAGRAPHS, flat_text, inside_chrome, selector},
    model::{ExtractionMiss, normalize_whitespace},
};

static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"script[type="application/ld+json"]"#));
static ITEMPROP_BODY: LazyLock<Selector> = LazyLock::new(|| selector(r#"[itemprop="articleBody"]"#));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static AUTHOR_META: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"meta[name="author"], meta[property="article:author"], meta[name="byl"]"#)
});
static AUTHOR_NODE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[rel="author"], [itemprop="author"], .byline, .author"#));

/// What the metadata parser found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub body: Option<String>,
}

/// Site-structure parser: reads the declared article body from JSON-LD or
/// microdata before falling back to the paragraphs of an `<article>`.
pub struct MetadataExtractor;

impl Heuristic for MetadataExtractor {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn extract(&self, html: &str, _url: &Url) -> Result<String, ExtractionMiss> {
        parse(html).body.ok_or(ExtractionMiss::NoContent)
    }
}

pub fn parse(html: &str) -> ArticleMetadata {
    let document = Html::parse_document(html);
    ArticleMetadata {
        title: page_title(&document),
        byline: byline(&document),
        body: json_ld_body(&document)
            .or_else(|| itemprop_body(&document))
            .or_else(|| article_paragraphs(&document)),
    }
}

/// og:title, then `<title>`, then the first `<h1>`.
pub fn page_title(document: &Html) -> Option<String> {
    let og = document
        .select(&OG_TITLE)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .find(|t| !t.is_empty());
    og.or_else(|| {
        [&*TITLE, &*H1].into_iter().find_map(|sel| {
            document
                .select(sel)
                .map(flat_text)
                .find(|t| !t.is_empty())
        })
    })
}

fn byline(document: &Html) -> Option<String> {
    document
        .select(&AUTHOR_META)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .find(|a| !a.is_empty() && !a.starts_with("http"))
        .or_else(|| {
            document
                .select(&AUTHOR_NODE)
                .map(flat_text)
                .find(|a| !a.is_empty() && a.len() < 120)
        })
}

fn json_ld_body(document: &Html) -> Option<String> {
    document
        .select(&JSON_LD)
        .filter_map(|script| serde_json::from_str::<Value>(&script.text().collect::<String>()).ok())
        .find_map(|value| find_article_body(&value).map(str::to_string))
        .map(|body| {
            if body.contains('<') {
                html_to_text(&body)
            } else {
                normalize_whitespace(&body)
            }
        })
        .filter(|body| !body.is_empty())
}

/// Depth-first search through objects, arrays and `@graph` for `articleBody`.
fn find_article_body(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map
            .get("articleBody")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| map.values().find_map(find_article_body)),
        Value::Array(items) => items.iter().find_map(find_article_body),
        _ => None,
    }
}

fn itemprop_body(document: &Html) -> Option<String> {
    let body = document.select(&ITEMPROP_BODY).next()?;
    let paragraphs: Vec<String> = body
        .select(&PARAGRAPHS)
        .filter(|p| !inside_chrome(*p))
        .map(flat_text)
        .filter(|t| !t.is_empty())
        .collect();
    if paragraphs.is_empty() {
        Some(flat_text(body)).filter(|t| !t.is_empty())
    } else {
        Some(paragraphs.join("\n\n"))
    }
}

fn article_paragraphs(document: &Html) -> Option<String> {
    document
        .select(&ARTICLE)
        .map(|article| {
            article
                .select(&PARAGRAPHS)
                .filter(|p| !inside_chrome(*p))
                .map(flat_text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .max_by_key(|text| text.len())
        .filter(|text| !text.is_empty())
}
