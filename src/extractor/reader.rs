use readability::extractor;
use url::Url;

use crate::extractor::{
    chain::Heuristic,
    cleaner::{html_to_text, sanitize},
    model::ExtractionMiss,
};

/// Readability DOM scoring, then sanitised HTML flattened to text.
pub struct ReadabilityExtractor;

impl Heuristic for ReadabilityExtractor {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn extract(&self, html: &str, url: &Url) -> Result<String, ExtractionMiss> {
        let article = extractor::extract(&mut html.as_bytes(), url)
            .map_err(|e| ExtractionMiss::Parse(e.to_string()))?;

        let text = html_to_text(&sanitize(&article.content));
        if text.is_empty() {
            return Err(ExtractionMiss::NoContent);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_main_article() {
        let body = "Researchers published the results of a decade-long study of coastal erosion, \
                    finding that the shoreline retreated faster than models predicted. ";
        let html = format!(
            "<html><head><title>Study</title></head><body><div class=\"menu\"><a href=\"/\">Home</a></div>\
             <div class=\"article\"><p>{0}</p><p>{0}</p><p>{0}</p></div></body></html>",
            body
        );
        let text = ReadabilityExtractor
            .extract(&html, &Url::parse("https://example.com/study").unwrap())
            .unwrap();
        assert!(text.contains("coastal erosion"));
        assert!(!text.contains("<p>"));
    }
}
