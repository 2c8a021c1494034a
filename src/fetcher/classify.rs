//! Blocked-access classifier.
//!
//! Turns a [`FetchError`] into a routing decision for the fetch chain. A 403
//! is never retried as-is, a timeout is retried within its strategy, and a
//! plain 404 skips straight to the proxy.

use crate::fetcher::errors::{FetchError, StrategyMiss};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 401/403: escalate to alternate paths, rendering and the proxy.
    Blocked(u16),
    /// Other 4xx: this strategy is done, only the proxy may still help.
    ClientError(u16),
    /// Worth one more bounded attempt in the current strategy.
    Transient,
    /// Retrying cannot change the outcome; move on.
    Fatal,
}

impl Disposition {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

pub fn classify(err: &FetchError) -> Disposition {
    match err {
        FetchError::Http { status } => classify_status(status.as_u16()),

        FetchError::Dns(_)
        | FetchError::Connect(_)
        | FetchError::ConnectTimeout
        | FetchError::RequestTimeout
        | FetchError::Io(_)
        | FetchError::Unknown(_) => Disposition::Transient,

        FetchError::InvalidUrl(_)
        | FetchError::UnsupportedScheme(_)
        | FetchError::RedirectLoop
        | FetchError::BodyTooLarge(_)
        | FetchError::UnsupportedContentType(_)
        | FetchError::RenderBackend(_)
        | FetchError::Client(_) => Disposition::Fatal,
    }
}

pub fn classify_status(status: u16) -> Disposition {
    match status {
        401 | 403 => Disposition::Blocked(status),
        429 => Disposition::Transient,
        400..=499 => Disposition::ClientError(status),
        500..=599 => Disposition::Transient,
        _ => Disposition::Fatal,
    }
}

impl From<FetchError> for StrategyMiss {
    fn from(err: FetchError) -> Self {
        match classify(&err) {
            Disposition::Blocked(status) => Self::Blocked(status),
            Disposition::ClientError(status) => Self::ClientError(status),
            Disposition::Transient => Self::Transient(err.to_string()),
            Disposition::Fatal => Self::Failed(err.to_string()),
        }
    }
}
