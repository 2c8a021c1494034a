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
use tracing::instrument;
use url::Url;

/// Plain GET against the origin with a browser user agent.
#[derive(Clone)]
pub struct DirectFetch {
    client: Client,
    retry: RetryPolicy,
}

impl DirectFetch {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            build_client(config.fetch_timeout)?,
            RetryPolicy::new(config.max_retries, config.retry_base_delay),
        ))
    }

    pub fn with_retry(&self, retry: RetryPolicy) -> Self {
        Self {
            client: self.client.clone(),
            retry,
        }
    }

    #[instrument(skip_all, fields(url = %url, strategy = %kind))]
    pub(crate) async fn get(&self, url: &Url, kind: StrategyKind) -> Result<RawPage, FetchError> {
        ensure_http(url)?;
        self.retry
            .run(kind.as_str(), |_| send(self.client.get(url.clone()), url, kind))
            .await
    }
}

#[async_trait]
impl FetchStrategy for DirectFetch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    async fn fetch(&self, url: &Url) -> Result<RawPage, StrategyMiss> {
        self.get(url, StrategyKind::Direct)
            .await
            .map_err(StrategyMiss::from)
    }
}
