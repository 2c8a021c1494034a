use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{AnalysisError, Analyzer, SYSTEM_PROMPT, build_client, check_status, user_prompt};

/// OpenAI-compatible chat-completions backend (OpenRouter by default).
#[derive(Clone)]
pub struct ChatCompletionsAnalyzer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatCompletionsAnalyzer {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>) -> Result<Self, AnalysisError> {
        Url::parse(endpoint)?;
        if api_key.is_none() {
            warn!("no analysis API key configured, chat-completions requests are unauthenticated");
        }
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Analyzer for ChatCompletionsAnalyzer {
    #[instrument(skip_all, fields(backend = "chat", model = %self.model, chars = text.chars().count()))]
    async fn analyze(&self, text: &str) -> Result<String, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }

        let prompt = user_prompt(text);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("X-Title", "News Analyzer")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = check_status(request.send().await?).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AnalysisError::MalformedResponse("no choices in response".into()))?;

        debug!("analysis returned {} chars", content.chars().count());
        Ok(content)
    }
}
