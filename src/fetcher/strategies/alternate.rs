use crate::config::FetchConfig;
use crate::fetcher::{
    errors::{FetchError, StrategyMiss},
    retry::RetryPolicy,
    strategies::{DirectFetch, FetchStrategy},
    types::{RawPage, StrategyKind},
};
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

/// Retries the origin through URL variants that simple blockers often let
/// through (AMP paths and query hints). Each variant gets a single attempt.
#[derive(Clone)]
pub struct AlternatePathFetch {
    direct: DirectFetch,
}

impl AlternatePathFetch {
    pub fn new(direct: DirectFetch) -> Self {
        Self {
            direct: direct.with_retry(RetryPolicy::none()),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::new(DirectFetch::from_config(config)?))
    }
}

/// Variants of `url` to try after a block, without the original.
pub fn alternate_urls(url: &Url) -> Vec<Url> {
    let path = url.path().trim_end_matches('/');
    let mut variants: Vec<Url> = Vec::new();

    let mut push = |candidate: Url| {
        if candidate != *url && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    };

    let mut suffixed = url.clone();
    suffixed.set_path(&format!("{}/amp", path));
    push(suffixed);

    if !path.is_empty() && !path.starts_with("/amp/") {
        let mut prefixed = url.clone();
        prefixed.set_path(&format!("/amp{}", path));
        push(prefixed);
    }

    for (key, value) in [("amp", "1"), ("outputType", "amp")] {
        let mut hinted = url.clone();
        hinted.query_pairs_mut().clear().append_pair(key, value);
        push(hinted);
    }

    variants
}

#[async_trait]
impl FetchStrategy for AlternatePathFetch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AlternatePath
    }

    async fn fetch(&self, url: &Url) -> Result<RawPage, StrategyMiss> {
        let mut last_miss = StrategyMiss::Failed("no alternate variants".to_string());

        for variant in alternate_urls(url) {
            match self.direct.get(&variant, StrategyKind::AlternatePath).await {
                Ok(page) => {
                    info!("alternate path {} succeeded", variant);
                    return Ok(page);
                }
                Err(err) => {
                    debug!("alternate path {} missed: {}", variant, err);
                    last_miss = StrategyMiss::from(err);
                }
            }
        }

        Err(last_miss)
    }
}
