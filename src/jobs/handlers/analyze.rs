use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::acquisition::Acquire;
use crate::analysis::Analyzer;
use crate::entities::{JobKind, JobPayload};
use crate::jobs::{JobError, JobHandler, handlers::extract::acquire_text};

/// Forwards text to the analysis collaborator, acquiring it first when the
/// job was submitted with a URL.
#[derive(Clone)]
pub struct AnalyzeJobHandler {
    acquirer: Arc<dyn Acquire>,
    analyzer: Arc<dyn Analyzer>,
}

impl AnalyzeJobHandler {
    pub fn new(acquirer: Arc<dyn Acquire>, analyzer: Arc<dyn Analyzer>) -> Self {
        Self { acquirer, analyzer }
    }
}

#[async_trait]
impl JobHandler for AnalyzeJobHandler {
    #[instrument(skip_all, fields(payload = payload.describe()))]
    async fn run(&self, payload: &JobPayload) -> anyhow::Result<String> {
        let text = match payload {
            JobPayload::Text(text) => text.clone(),
            JobPayload::Url(url) => acquire_text(self.acquirer.as_ref(), url).await?,
        };

        let analysis = self
            .analyzer
            .analyze(&text)
            .await
            .map_err(JobError::from)?;
        info!("Analysis produced {} chars", analysis.chars().count());
        Ok(analysis)
    }

    fn kind(&self) -> JobKind {
        JobKind::Analyze
    }
}
