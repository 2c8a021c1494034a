//! One retry policy for every strategy.
//!
//! The "retry a timeout, never retry a block" rule lives here and nowhere
//! else; strategies only choose how many retries they get.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::fetcher::classify::classify;
use crate::fetcher::errors::FetchError;

const MAX_EXPONENT: u32 = 6;
const MAX_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Exponential backoff with ±30% jitter, capped at ten seconds.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(MAX_EXPONENT);
        let base_ms = self.base_delay.as_millis() as f64 * f64::from(2_u32.pow(exponent));
        let jitter = rand::thread_rng().gen_range(0.7..1.3);
        Duration::from_millis((base_ms * jitter).round() as u64).min(MAX_DELAY)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// retry budget is spent. `op` receives the zero-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if classify(&err).is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} attempt {} failed ({}), retrying in {}ms",
                        label,
                        attempt + 1,
                        err,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!("{} giving up after {} attempt(s): {}", label, attempt + 1, err);
                    return Err(err);
                }
            }
        }
    }
}
