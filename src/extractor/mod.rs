pub mod chain;
pub mod cleaner;
pub mod density;
pub mod dom;
pub mod fallback;
pub mod language;
pub mod metadata;
pub mod model;
pub mod paragraphs;
pub mod reader;

#[cfg(test)]
mod tests;

pub use chain::{DEFAULT_MIN_CHARS, ExtractionChain, Heuristic};
pub use density::DensityExtractor;
pub use fallback::StructuralFallback;
pub use metadata::MetadataExtractor;
pub use model::{Extraction, ExtractionMiss, UNAVAILABLE_SENTINEL, normalize_whitespace};
pub use paragraphs::ParagraphClusterExtractor;
pub use reader::ReadabilityExtractor;
