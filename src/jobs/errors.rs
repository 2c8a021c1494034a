use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::entities::{JobKind, JobStatus};

/// Failures raised while a worker executes a job. The `Display` text is what
/// a caller sees when polling a failed job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Access blocked (HTTP {status}): the site refused automated access and no fallback produced content")]
    AccessBlocked { status: u16 },

    #[error("Could not retrieve article text: {0}")]
    AcquisitionUnavailable(String),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("{kind} job cannot take a {payload} payload")]
    InvalidPayload {
        kind: JobKind,
        payload: &'static str,
    },

    #[error("Job produced an empty result")]
    EmptyResult,

    #[error("No handler registered for job kind: {0}")]
    NoHandler(JobKind),

    #[error("Internal error while processing job")]
    Panicked,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} is not a terminal status")]
    NotTerminal(JobStatus),
}

/// Synchronous submission failures. No job exists when one of these is
/// returned.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("url is required")]
    EmptyUrl,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("text is too short to analyze ({chars} chars, at least {min} required)")]
    TextTooShort { chars: usize, min: usize },

    #[error("{kind} jobs cannot take a {payload} payload")]
    PayloadMismatch {
        kind: JobKind,
        payload: &'static str,
    },

    #[error("job store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("scheduler is shutting down")]
    ShuttingDown,
}

impl SubmitError {
    /// Caller mistakes, as opposed to server-side trouble.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SubmitError::Store(_) | SubmitError::ShuttingDown)
    }
}
