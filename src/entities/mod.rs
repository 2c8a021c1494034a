use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// --- PostgreSQL Enums ---
#[derive(
    sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[sqlx(type_name = "job_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// URL in, article text out.
    Extract,
    /// Text (or a URL to acquire first) in, analysis text out.
    Analyze,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Extract => "extract",
            JobKind::Analyze => "analyze",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    /// `done` and `failed` are final; nothing moves a job out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// --- Tables ---

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, ToSchema)]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    /// Empty until terminal; text on `done`, a short reason on `failed`.
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn pending(id: Uuid, kind: JobKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            status: JobStatus::Pending,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Work handed to a job handler. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPayload {
    Url(String),
    Text(String),
}

impl JobPayload {
    pub fn describe(&self) -> &'static str {
        match self {
            JobPayload::Url(_) => "url",
            JobPayload::Text(_) => "text",
        }
    }
}
