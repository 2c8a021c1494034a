pub mod chain;
pub mod classify;
pub mod client;
pub mod decode;
pub mod errors;
pub mod normalize;
pub mod retry;
pub mod strategies;
pub mod types;

pub use chain::{ChainOutcome, FetchChain};
pub use classify::{Disposition, classify};
pub use errors::{FetchError, StrategyMiss};
pub use normalize::normalize_url;
pub use retry::RetryPolicy;
pub use strategies::{AlternatePathFetch, DirectFetch, FetchStrategy, ProxyFetch, RenderFetch};
pub use types::{RawPage, StrategyKind};
