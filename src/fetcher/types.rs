use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use url::Url;

/// One way of obtaining markup for a URL, in chain priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Direct,
    AlternatePath,
    Render,
    Proxy,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::AlternatePath => "alternate_path",
            Self::Render => "render",
            Self::Proxy => "proxy",
        }
    }

    /// Direct and alternate fetches talk to the target site itself.
    pub fn hits_origin(&self) -> bool {
        matches!(self, Self::Direct | Self::AlternatePath)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded markup produced by a strategy.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// The page the markup belongs to (after redirects for origin fetches).
    pub url: Url,
    pub status: StatusCode,
    pub html: String,
    pub charset: &'static str,
    pub strategy: StrategyKind,
    pub fetched_at: DateTime<Utc>,
}
