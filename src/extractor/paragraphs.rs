use scraper::{ElementRef, Html};
use std::collections::HashMap;
use url::Url;

use crate::extractor::{
    chain::Heuristic,
    dom::{PARAGRAPHS, flat_text, inside_chrome, link_density},
    model::ExtractionMiss,
};

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "are", "as", "at", "be", "been", "but",
    "by", "can", "could", "for", "from", "had", "has", "have", "he", "her", "his", "in", "into",
    "is", "it", "its", "more", "not", "of", "on", "one", "or", "said", "she", "so", "than",
    "that", "the", "their", "there", "they", "this", "to", "was", "we", "were", "when", "which",
    "who", "will", "with", "would",
];

const MIN_STOPWORDS: usize = 2;
const MAX_LINK_DENSITY: f64 = 0.5;

/// Goose-style clustering: each prose paragraph votes for its parent (full
/// weight) and grandparent (half weight); the best-scoring container's
/// paragraphs become the article.
pub struct ParagraphClusterExtractor;

fn stopword_count(text: &str) -> usize {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .filter(|w| STOPWORDS.contains(&w.to_lowercase().as_str()))
        .count()
}

fn is_prose(paragraph: ElementRef<'_>) -> Option<(String, usize)> {
    if inside_chrome(paragraph) {
        return None;
    }
    let text = flat_text(paragraph);
    let stops = stopword_count(&text);
    if stops < MIN_STOPWORDS || link_density(paragraph, text.chars().count()) > MAX_LINK_DENSITY {
        return None;
    }
    Some((text, stops))
}

impl Heuristic for ParagraphClusterExtractor {
    fn name(&self) -> &'static str {
        "paragraph_cluster"
    }

    fn extract(&self, html: &str, _url: &Url) -> Result<String, ExtractionMiss> {
        let document = Html::parse_document(html);
        let mut scores = HashMap::new();

        for paragraph in document.select(&PARAGRAPHS) {
            let Some((_, stops)) = is_prose(paragraph) else {
                continue;
            };
            let mut ancestors = paragraph.ancestors().filter_map(ElementRef::wrap);
            if let Some(parent) = ancestors.next() {
                *scores.entry(parent.id()).or_insert(0.0) += stops as f64;
            }
            if let Some(grandparent) = ancestors.next() {
                *scores.entry(grandparent.id()).or_insert(0.0) += stops as f64 / 2.0;
            }
        }

        let best = scores
            .into_iter()
            .max_by(|a: &(_, f64), b: &(_, f64)| a.1.total_cmp(&b.1))
            .and_then(|(id, _)| document.tree.get(id))
            .and_then(ElementRef::wrap)
            .ok_or(ExtractionMiss::NoContent)?;

        let paragraphs: Vec<String> = best
            .select(&PARAGRAPHS)
            .filter_map(is_prose)
            .map(|(text, _)| text)
            .collect();

        if paragraphs.is_empty() {
            return Err(ExtractionMiss::NoContent);
        }
        Ok(paragraphs.join("\n\n"))
    }
}
