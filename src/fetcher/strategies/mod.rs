mod alternate;
mod direct;
mod proxy;
mod render;

pub use alternate::{AlternatePathFetch, alternate_urls};
pub use direct::DirectFetch;
pub use proxy::ProxyFetch;
pub use render::RenderFetch;

use crate::fetcher::{
    errors::StrategyMiss,
    types::{RawPage, StrategyKind},
};
use async_trait::async_trait;
use url::Url;

/// One way of turning a URL into markup.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn fetch(&self, url: &Url) -> Result<RawPage, StrategyMiss>;
}
