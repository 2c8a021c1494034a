use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::extractor::{
    chain::Heuristic,
    dom::{PARAGRAPHS, flat_text, inside_chrome, link_density, selector},
    model::ExtractionMiss,
};

static TEXT_BLOCKS: LazyLock<Selector> = LazyLock::new(|| selector("p, blockquote, pre, li"));

const MIN_WORDS: usize = 8;
const MAX_LINK_DENSITY: f64 = 0.33;

/// Boilerplate removal by text density.
///
/// Keeps every text block outside page chrome that has enough words and few
/// enough links, in document order. Lists and quotes that wrap their own
/// paragraphs defer to those paragraphs.
pub struct DensityExtractor;

impl DensityExtractor {
    fn keep(block: ElementRef<'_>) -> Option<String> {
        if block.value().name() != "p" && block.select(&PARAGRAPHS).next().is_some() {
            return None;
        }
        if inside_chrome(block) {
            return None;
        }

        let text = flat_text(block);
        let words = text.split_whitespace().count();
        if words < MIN_WORDS {
            return None;
        }
        if link_density(block, text.chars().count()) > MAX_LINK_DENSITY {
            return None;
        }
        Some(text)
    }
}

impl Heuristic for DensityExtractor {
    fn name(&self) -> &'static str {
        "density"
    }

    fn extract(&self, html: &str, _url: &Url) -> Result<String, ExtractionMiss> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        let blocks: Vec<String> = document
            .select(&TEXT_BLOCKS)
            .filter_map(Self::keep)
            .filter(|text| seen.insert(text.clone()))
            .collect();

        if blocks.is_empty() {
            return Err(ExtractionMiss::NoContent);
        }
        Ok(blocks.join("\n\n"))
    }
}
