//! Acquisition: URL in, article text (or a typed reason there is none) out.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::extractor::{Extraction, ExtractionChain, language::detect_language};
use crate::fetcher::{
    ChainOutcome, FetchChain, FetchError, StrategyKind, client::ensure_http, normalize::strip,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Normalised URL the article was requested as.
    pub url: String,
    pub text: String,
    pub heuristic: &'static str,
    pub strategy: StrategyKind,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionResult {
    Text(Article),
    /// The remote actively refused access and no fallback produced markup.
    Blocked { status: u16 },
    /// No strategy produced usable content.
    Unavailable { reason: String },
}

/// The acquisition boundary shared by the job workers, the CLI and tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Acquire: Send + Sync {
    async fn acquire(&self, url: &str) -> AcquisitionResult;
}

pub struct Acquirer {
    chain: FetchChain,
    extractor: ExtractionChain,
}

impl Acquirer {
    pub fn new(chain: FetchChain, extractor: ExtractionChain) -> Self {
        Self { chain, extractor }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            FetchChain::from_config(config)?,
            ExtractionChain::standard(config.min_extract_chars),
        ))
    }
}

#[async_trait]
impl Acquire for Acquirer {
    #[instrument(skip(self))]
    async fn acquire(&self, url: &str) -> AcquisitionResult {
        let parsed = match Url::parse(url.trim()) {
            Ok(parsed) => strip(parsed),
            Err(e) => {
                return AcquisitionResult::Unavailable {
                    reason: format!("invalid url: {}", e),
                };
            }
        };
        if let Err(e) = ensure_http(&parsed) {
            return AcquisitionResult::Unavailable {
                reason: e.to_string(),
            };
        }

        let outcome = self
            .chain
            .run(&parsed, |page| match self.extractor.extract(&page.html, &page.url) {
                Extraction::Accepted { heuristic, text } => Some((heuristic, text)),
                Extraction::Unavailable => None,
            })
            .await;

        match outcome {
            ChainOutcome::Accepted {
                value: (heuristic, text),
                strategy,
            } => {
                info!(
                    "acquired {} chars via {} strategy and {} heuristic",
                    text.chars().count(),
                    strategy,
                    heuristic
                );
                AcquisitionResult::Text(Article {
                    url: parsed.to_string(),
                    language: detect_language(&text),
                    text,
                    heuristic,
                    strategy,
                })
            }
            ChainOutcome::Blocked { status } => {
                warn!("access blocked (HTTP {}) and no fallback produced markup", status);
                AcquisitionResult::Blocked { status }
            }
            ChainOutcome::Unavailable { attempts } => {
                let reason = if attempts.is_empty() {
                    "no fetch strategy produced content".to_string()
                } else {
                    attempts
                        .iter()
                        .map(|(kind, why)| format!("{}: {}", kind, why))
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                warn!("acquisition unavailable: {}", reason);
                AcquisitionResult::Unavailable { reason }
            }
        }
    }
}
