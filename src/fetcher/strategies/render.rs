use crate::config::FetchConfig;
use crate::fetcher::{
    client::{build_client, ensure_http, send},
    errors::{FetchError, StrategyMiss},
    strategies::FetchStrategy,
    types::{RawPage, StrategyKind},
};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::json;
use std::{sync::LazyLock, time::Duration};
use tracing::{instrument, warn};
use url::Url;

static BODY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<body[\s>]").unwrap());

/// Fetch through a headless-browser rendering service that executes page
/// scripts and returns the resulting DOM (browserless-style `/content` API).
///
/// Backend errors and timeouts are never retried: the page is simply
/// reported as missing.
#[derive(Clone)]
pub struct RenderFetch {
    backend: Option<RenderBackend>,
}

#[derive(Clone)]
struct RenderBackend {
    client: Client,
    content_url: Url,
    timeout: Duration,
}

impl RenderFetch {
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn new(endpoint: &str, token: Option<&str>, timeout: Duration) -> Result<Self, FetchError> {
        let mut base = Url::parse(endpoint)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut content_url = base.join("content")?;
        if let Some(token) = token {
            content_url.query_pairs_mut().append_pair("token", token);
        }

        Ok(Self {
            backend: Some(RenderBackend {
                client: build_client(timeout)?,
                content_url,
                timeout,
            }),
        })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        match &config.render_endpoint {
            Some(endpoint) => Self::new(
                endpoint,
                config.render_token.as_deref(),
                config.render_timeout,
            ),
            None => Ok(Self::disabled()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }
}

/// Split the client's whole-request `timeout` between the backend's
/// navigation and selector waits, in milliseconds. A tenth is held back so
/// the backend can still answer before the client gives up.
fn wait_budget(timeout: Duration) -> (u64, u64) {
    let total = timeout.as_millis() as u64;
    (total * 6 / 10, total * 3 / 10)
}

/// The page-ready condition: the rendered document has a body.
fn has_body(html: &str) -> bool {
    BODY_TAG.is_match(html)
}

#[async_trait]
impl FetchStrategy for RenderFetch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Render
    }

    #[instrument(skip_all, fields(url = %url, strategy = "render"))]
    async fn fetch(&self, url: &Url) -> Result<RawPage, StrategyMiss> {
        let Some(backend) = &self.backend else {
            return Err(StrategyMiss::NotConfigured);
        };
        ensure_http(url).map_err(StrategyMiss::from)?;

        let (goto_ms, selector_ms) = wait_budget(backend.timeout);
        let request = backend.client.post(backend.content_url.clone()).json(&json!({
            "url": url.as_str(),
            "gotoOptions": { "waitUntil": "domcontentloaded", "timeout": goto_ms },
            "waitForSelector": { "selector": "body", "timeout": selector_ms },
        }));

        let page = send(request, url, StrategyKind::Render)
            .await
            .map_err(|err| {
                warn!("render backend failed for {}: {}", url, err);
                StrategyMiss::Failed(FetchError::RenderBackend(err.to_string()).to_string())
            })?;

        if !has_body(&page.html) {
            return Err(StrategyMiss::Failed(
                "render backend returned a page without a body".to_string(),
            ));
        }

        Ok(page)
    }
}
