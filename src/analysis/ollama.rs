use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::{AnalysisError, Analyzer, SYSTEM_PROMPT, build_client, check_status, user_prompt};

/// Local model served through Ollama's `/api/generate`.
#[derive(Clone)]
pub struct OllamaAnalyzer {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl OllamaAnalyzer {
    pub fn new(endpoint: &str, model: &str) -> Result<Self, AnalysisError> {
        Url::parse(endpoint)?;
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Analyzer for OllamaAnalyzer {
    #[instrument(skip_all, fields(backend = "ollama", model = %self.model, chars = text.chars().count()))]
    async fn analyze(&self, text: &str) -> Result<String, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }

        let body = GenerateRequest {
            model: &self.model,
            prompt: format!("{}\n\n{}", SYSTEM_PROMPT, user_prompt(text)),
            stream: false,
        };

        let response = check_status(self.client.post(&self.endpoint).json(&body).send().await?).await?;
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        let output = parsed
            .response
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| AnalysisError::MalformedResponse("missing 'response' field".into()))?;

        debug!("analysis returned {} chars", output.chars().count());
        Ok(output)
    }
}
