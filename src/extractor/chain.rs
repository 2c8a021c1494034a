//! Extraction fallback chain.
//!
//! Heuristics run in precision order; the first whose output is longer than
//! the minimum wins. Each heuristic runs behind `catch_unwind`, so a panic in
//! one parser only costs that heuristic.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};
use url::Url;

use crate::extractor::{
    density::DensityExtractor,
    fallback::StructuralFallback,
    metadata::MetadataExtractor,
    model::{Extraction, ExtractionMiss},
    paragraphs::ParagraphClusterExtractor,
    reader::ReadabilityExtractor,
};

pub const DEFAULT_MIN_CHARS: usize = 100;

/// One algorithm that tries to isolate the main content of a page.
pub trait Heuristic: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns whitespace-normalised text.
    fn extract(&self, html: &str, url: &Url) -> Result<String, ExtractionMiss>;
}

pub struct ExtractionChain {
    heuristics: Vec<Box<dyn Heuristic>>,
    min_chars: usize,
}

impl ExtractionChain {
    pub fn new(heuristics: Vec<Box<dyn Heuristic>>, min_chars: usize) -> Self {
        Self {
            heuristics,
            min_chars,
        }
    }

    /// Density extractor, metadata parser, readability, paragraph clusters,
    /// then the structural fallback.
    pub fn standard(min_chars: usize) -> Self {
        Self::new(
            vec![
                Box::new(DensityExtractor),
                Box::new(MetadataExtractor),
                Box::new(ReadabilityExtractor),
                Box::new(ParagraphClusterExtractor),
                Box::new(StructuralFallback),
            ],
            min_chars,
        )
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    pub fn heuristic_names(&self) -> Vec<&'static str> {
        self.heuristics.iter().map(|h| h.name()).collect()
    }

    pub fn extract(&self, html: &str, url: &Url) -> Extraction {
        for heuristic in &self.heuristics {
            let name = heuristic.name();
            match self.run_one(heuristic.as_ref(), html, url) {
                Ok(text) => {
                    debug!("{} accepted ({} chars)", name, text.chars().count());
                    return Extraction::Accepted {
                        heuristic: name,
                        text,
                    };
                }
                Err(ExtractionMiss::Panicked(message)) => {
                    warn!("{} panicked on {}: {}", name, url, message);
                }
                Err(miss) => {
                    debug!("{} missed: {}", name, miss);
                }
            }
        }
        Extraction::Unavailable
    }

    fn run_one(
        &self,
        heuristic: &dyn Heuristic,
        html: &str,
        url: &Url,
    ) -> Result<String, ExtractionMiss> {
        let text = catch_unwind(AssertUnwindSafe(|| heuristic.extract(html, url)))
            .map_err(|payload| ExtractionMiss::Panicked(panic_message(payload.as_ref())))??;

        let chars = text.chars().count();
        if chars > self.min_chars {
            Ok(text)
        } else {
            Err(ExtractionMiss::TooShort {
                chars,
                min: self.min_chars,
            })
        }
    }
}

impl Default for ExtractionChain {
    fn default() -> Self {
        Self::standard(DEFAULT_MIN_CHARS)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
