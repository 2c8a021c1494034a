//! Analysis collaborator: one request carrying article text, one text reply.
//!
//! The prompt is a placeholder; scoring rubrics live with whoever operates
//! the model, not here.

pub mod chat;
pub mod ollama;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use thiserror::Error;

use crate::config::{AnalysisBackend, AnalysisConfig};

pub use chat::ChatCompletionsAnalyzer;
pub use ollama::OllamaAnalyzer;

pub const SYSTEM_PROMPT: &str = "You analyze news articles for factual accuracy and political bias.";

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("analysis service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid analysis endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("nothing to analyze")]
    EmptyText,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<String, AnalysisError>;
}

/// Build the backend named by the configuration.
pub fn from_config(config: &AnalysisConfig) -> Result<Arc<dyn Analyzer>, AnalysisError> {
    let analyzer: Arc<dyn Analyzer> = match config.backend {
        AnalysisBackend::ChatCompletions => Arc::new(ChatCompletionsAnalyzer::new(
            &config.endpoint,
            &config.model,
            config.api_key.clone(),
        )?),
        AnalysisBackend::Ollama => Arc::new(OllamaAnalyzer::new(&config.endpoint, &config.model)?),
    };
    Ok(analyzer)
}

pub(crate) fn build_client() -> Result<reqwest::Client, AnalysisError> {
    Ok(reqwest::Client::builder()
        .timeout(ANALYSIS_TIMEOUT)
        .build()?)
}

pub(crate) fn user_prompt(text: &str) -> String {
    format!(
        "Assess the factual evidence and political bias of the following article.\n\nText:\n{}",
        text
    )
}

/// Turn a non-2xx response into `AnalysisError::Status`, keeping the start
/// of the upstream body for diagnosis.
pub(crate) async fn check_status(response: Response) -> Result<Response, AnalysisError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AnalysisError::Status {
        status: status.as_u16(),
        body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
    })
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
