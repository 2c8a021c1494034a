use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{Job, JobKind, JobStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitUrlRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitTextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    /// Absent while the job is `pending` or `running`.
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            kind: job.kind,
            status: job.status,
            result: job.result,
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
