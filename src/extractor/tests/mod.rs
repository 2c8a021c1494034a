use std::fs;
use url::Url;

use crate::extractor::{
    DensityExtractor, Extraction, ExtractionChain, Heuristic, UNAVAILABLE_SENTINEL, metadata,
};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{}", name))
        .expect("Failed to read test fixture")
}

fn url(path: &str) -> Url {
    Url::parse(&format!("https://example.com/{}", path)).unwrap()
}

#[test]
fn test_extract_article() {
    let html = fixture("article.html");
    let result = ExtractionChain::default().extract(&html, &url("article"));

    let Extraction::Accepted { heuristic, text } = result else {
        panic!("article fixture should extract");
    };
    assert_eq!(heuristic, "density");
    assert!(text.starts_with("The city council voted seven to two"));
    assert!(text.contains("eighteen months"));
    assert!(!text.contains("cookies"));
    assert!(!text.contains("Copyright"));
    assert!(!text.contains("Five other bridges"));
}

#[test]
fn test_chain_output_matches_first_heuristic() {
    let html = fixture("article.html");
    let direct = DensityExtractor.extract(&html, &url("article")).unwrap();
    let chained = ExtractionChain::default()
        .extract(&html, &url("article"))
        .into_text()
        .unwrap();
    assert_eq!(direct, chained);
}

#[test]
fn test_script_rendered_page_uses_structured_data() {
    let html = fixture("app_shell.html");
    let result = ExtractionChain::default().extract(&html, &url("markets"));

    let Extraction::Accepted { heuristic, text } = result else {
        panic!("JSON-LD body should be found");
    };
    assert_eq!(heuristic, "metadata");
    assert!(text.starts_with("Stock markets rose sharply"));
}

#[test]
fn test_metadata_fields() {
    let meta = metadata::parse(&fixture("article.html"));
    assert_eq!(meta.title.as_deref(), Some("Council Approves River Crossing"));
    assert_eq!(meta.byline.as_deref(), Some("Sam Rivera"));
}

#[test]
fn test_reject_empty_page() {
    let html = fixture("empty.html");
    let result = ExtractionChain::default().extract(&html, &url("empty"));

    assert_eq!(result, Extraction::Unavailable);
    assert_eq!(result.text_or_sentinel(), UNAVAILABLE_SENTINEL);
}

#[test]
fn test_paragraphless_markup_is_still_recovered() {
    let html = fixture("divs_only.html");
    let text = ExtractionChain::default()
        .extract(&html, &url("beach"))
        .into_text()
        .expect("a later heuristic should recover div text");
    assert!(text.contains("two hundred bags"));
}

#[test]
fn test_malformed_html() {
    let html = format!(
        "<html><head><title>Broken</title><body><p>Unclosed tags<div>{}",
        "More content that keeps going without any closing tags at all. ".repeat(4)
    );
    let result = ExtractionChain::default().extract(&html, &url("broken"));
    if let Extraction::Accepted { text, .. } = result {
        assert!(text.contains("More content"));
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(
            html in ".*",
            path in "[a-z]{0,12}"
        ) {
            // Should never panic regardless of input
            let _ = ExtractionChain::default().extract(&html, &url(&path));
        }

        #[test]
        fn test_accepted_text_clears_threshold(html in ".*") {
            if let Extraction::Accepted { text, .. } = ExtractionChain::default().extract(&html, &url("")) {
                prop_assert!(text.chars().count() > crate::extractor::DEFAULT_MIN_CHARS);
            }
        }
    }
}
