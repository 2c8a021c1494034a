use async_trait::async_trait;

use crate::entities::{JobKind, JobPayload};

/// Trait for handling specific job types
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    /// Execute the job and return the text stored as its result. Errors are
    /// stored as the failure reason, so their `Display` should read well.
    async fn run(&self, payload: &JobPayload) -> anyhow::Result<String>;

    /// Get the job kind this handler processes
    fn kind(&self) -> JobKind;
}
