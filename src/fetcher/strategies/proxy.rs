use crate::config::FetchConfig;
use crate::fetcher::{
    client::{build_client, ensure_http, send},
    errors::{FetchError, StrategyMiss},
    retry::RetryPolicy,
    strategies::FetchStrategy,
    types::{RawPage, StrategyKind},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{instrument, warn};
use url::Url;

/// Last resort: a third-party scraping service (ScraperAPI wire format) in
/// render + premium routing mode. Without a key this strategy is skipped.
#[derive(Clone)]
pub struct ProxyFetch {
    client: Client,
    endpoint: Url,
    key: Option<String>,
    retry: RetryPolicy,
}

impl ProxyFetch {
    pub fn new(
        endpoint: &str,
        key: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: Url::parse(endpoint)?,
            key,
            retry,
        })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.scraper_endpoint,
            config.scraper_key.clone(),
            config.proxy_timeout,
            RetryPolicy::new(1, config.retry_base_delay),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }
}

#[async_trait]
impl FetchStrategy for ProxyFetch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Proxy
    }

    // skip_all keeps the key out of span fields
    #[instrument(skip_all, fields(url = %url, strategy = "proxy"))]
    async fn fetch(&self, url: &Url) -> Result<RawPage, StrategyMiss> {
        let Some(key) = self.key.as_deref() else {
            return Err(StrategyMiss::NotConfigured);
        };
        ensure_http(url).map_err(StrategyMiss::from)?;

        let result = self
            .retry
            .run("proxy", |_| {
                let request = self.client.get(self.endpoint.clone()).query(&[
                    ("api_key", key),
                    ("url", url.as_str()),
                    ("render", "true"),
                    ("premium", "true"),
                ]);
                send(request, url, StrategyKind::Proxy)
            })
            .await;

        let page = match result {
            Ok(page) => page,
            // 401/403 here is the proxy refusing our key, not the site blocking us
            Err(FetchError::Http { status }) if matches!(status.as_u16(), 401 | 403) => {
                warn!("proxy rejected credentials (HTTP {})", status.as_u16());
                return Err(StrategyMiss::Failed(format!(
                    "proxy rejected credentials (HTTP {})",
                    status.as_u16()
                )));
            }
            Err(err) => return Err(StrategyMiss::from(err)),
        };

        if page.html.trim().is_empty() {
            return Err(StrategyMiss::Failed("proxy returned an empty body".to_string()));
        }

        Ok(page)
    }
}
