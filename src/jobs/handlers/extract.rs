use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::acquisition::{Acquire, AcquisitionResult};
use crate::entities::{JobKind, JobPayload};
use crate::jobs::{JobError, JobHandler};

/// Runs the acquisition pipeline and stores the article text.
#[derive(Clone)]
pub struct ExtractJobHandler {
    acquirer: Arc<dyn Acquire>,
}

impl ExtractJobHandler {
    pub fn new(acquirer: Arc<dyn Acquire>) -> Self {
        Self { acquirer }
    }
}

/// Shared by the extract and analyze handlers: text or a job-level failure.
pub(crate) async fn acquire_text(acquirer: &dyn Acquire, url: &str) -> Result<String, JobError> {
    match acquirer.acquire(url).await {
        AcquisitionResult::Text(article) => {
            info!(
                "Acquired {} chars from {} ({} strategy, {} heuristic)",
                article.text.chars().count(),
                article.url,
                article.strategy,
                article.heuristic
            );
            Ok(article.text)
        }
        AcquisitionResult::Blocked { status } => {
            warn!("Access to {} blocked with HTTP {}", url, status);
            Err(JobError::AccessBlocked { status })
        }
        AcquisitionResult::Unavailable { reason } => {
            warn!("No usable content for {}: {}", url, reason);
            Err(JobError::AcquisitionUnavailable(reason))
        }
    }
}

#[async_trait]
impl JobHandler for ExtractJobHandler {
    #[instrument(skip_all, fields(payload = payload.describe()))]
    async fn run(&self, payload: &JobPayload) -> anyhow::Result<String> {
        let JobPayload::Url(url) = payload else {
            return Err(JobError::InvalidPayload {
                kind: JobKind::Extract,
                payload: payload.describe(),
            }
            .into());
        };

        Ok(acquire_text(self.acquirer.as_ref(), url).await?)
    }

    fn kind(&self) -> JobKind {
        JobKind::Extract
    }
}
