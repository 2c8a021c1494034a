//! Fetch strategy chain.
//!
//! Strategies run in a fixed order (direct, alternate paths, render, proxy)
//! and the chain stops at the first page the caller accepts. What the direct
//! fetch reports decides which later strategies are eligible:
//!
//! | direct result          | next eligible               |
//! |------------------------|-----------------------------|
//! | 401 / 403              | alternate, render, proxy    |
//! | other 4xx              | proxy                       |
//! | transient / unusable   | render, proxy               |

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::fetcher::{
    errors::{FetchError, StrategyMiss},
    strategies::{AlternatePathFetch, DirectFetch, FetchStrategy, ProxyFetch, RenderFetch},
    types::{RawPage, StrategyKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome<T> {
    /// A strategy produced a page the caller accepted.
    Accepted { value: T, strategy: StrategyKind },
    /// The origin refused us and nothing later produced any markup.
    Blocked { status: u16 },
    /// Every eligible strategy missed, or all markup was rejected.
    Unavailable { attempts: Vec<(StrategyKind, String)> },
}

#[derive(Clone)]
pub struct FetchChain {
    strategies: Vec<Arc<dyn FetchStrategy>>,
}

#[derive(Default)]
struct Routing {
    blocked: Option<u16>,
    proxy_only: bool,
    markup_seen: bool,
}

impl Routing {
    fn eligible(&self, kind: StrategyKind) -> bool {
        match kind {
            StrategyKind::Direct => true,
            StrategyKind::AlternatePath => self.blocked.is_some() && !self.proxy_only,
            StrategyKind::Render => !self.proxy_only,
            StrategyKind::Proxy => true,
        }
    }

    fn record_direct_miss(&mut self, miss: &StrategyMiss) {
        match miss {
            StrategyMiss::Blocked(status) => self.blocked = Some(*status),
            StrategyMiss::ClientError(_) => self.proxy_only = true,
            _ => {}
        }
    }
}

impl FetchChain {
    /// Strategies are tried in the order given.
    pub fn new(strategies: Vec<Arc<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let direct = DirectFetch::from_config(config)?;
        let render = RenderFetch::from_config(config)?;
        let proxy = ProxyFetch::from_config(config)?;

        if !render.is_enabled() {
            info!("render backend not configured, render strategy disabled");
        }
        if !proxy.is_enabled() {
            info!("no scraper key configured, proxy strategy disabled");
        }

        Ok(Self::new(vec![
            Arc::new(direct.clone()),
            Arc::new(AlternatePathFetch::new(direct)),
            Arc::new(render),
            Arc::new(proxy),
        ]))
    }

    /// Run strategies until `accept` turns a page into a value.
    ///
    /// A page `accept` rejects counts as unusable markup and the chain keeps
    /// going. No strategy runs after one has been accepted.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn run<T, F>(&self, url: &Url, mut accept: F) -> ChainOutcome<T>
    where
        T: Send,
        F: FnMut(&RawPage) -> Option<T> + Send,
    {
        let mut routing = Routing::default();
        let mut attempts = Vec::new();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            if !routing.eligible(kind) {
                debug!("skipping {} strategy", kind);
                continue;
            }

            match strategy.fetch(url).await {
                Ok(page) => {
                    routing.markup_seen = true;
                    if let Some(value) = accept(&page) {
                        info!("{} strategy produced usable content", kind);
                        return ChainOutcome::Accepted {
                            value,
                            strategy: kind,
                        };
                    }
                    warn!("{} strategy returned markup without usable content", kind);
                    attempts.push((kind, "no usable content in markup".to_string()));
                }
                Err(StrategyMiss::NotConfigured) => {
                    debug!("{} strategy not configured, skipped", kind);
                }
                Err(miss) => {
                    warn!("{} strategy missed: {}", kind, miss);
                    if kind == StrategyKind::Direct {
                        routing.record_direct_miss(&miss);
                    }
                    attempts.push((kind, miss.to_string()));
                }
            }
        }

        match routing.blocked {
            Some(status) if !routing.markup_seen => ChainOutcome::Blocked { status },
            _ => ChainOutcome::Unavailable { attempts },
        }
    }
}
