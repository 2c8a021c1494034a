//! Job Store: the only state shared between workers and pollers.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::{Job, JobKind, JobStatus};
use crate::jobs::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a `pending` record. Re-creating an id that is still `pending`
    /// refreshes it; a `running` or terminal record is returned unchanged,
    /// so status never moves backwards.
    async fn create(&self, id: Uuid, kind: JobKind) -> Result<Job, StoreError>;

    /// `pending` → `running`. Anything else is ignored.
    async fn mark_running(&self, id: Uuid) -> Result<(), StoreError>;

    /// Move a live job to `done` or `failed`. Unknown ids and already
    /// terminal jobs are logged and ignored.
    async fn set_result(&self, id: Uuid, status: JobStatus, result: String)
    -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    /// Reachability check for health probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Process-local store. Each record sits behind its own shard lock, so a
/// reader waits at most for a single write to the same record.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<Uuid, Job>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, id: Uuid, kind: JobKind) -> Result<Job, StoreError> {
        let mut entry = self
            .jobs
            .entry(id)
            .or_insert_with(|| Job::pending(id, kind));
        if entry.status != JobStatus::Pending {
            warn!("job {} is already {}, keeping existing record", id, entry.status);
        } else if entry.kind != kind {
            *entry = Job::pending(id, kind);
        }
        Ok(entry.value().clone())
    }

    async fn mark_running(&self, id: Uuid) -> Result<(), StoreError> {
        match self.jobs.get_mut(&id) {
            Some(mut job) if job.status == JobStatus::Pending => {
                job.status = JobStatus::Running;
                job.updated_at = Utc::now();
            }
            Some(job) => debug!("job {} is {}, not marking running", id, job.status),
            None => warn!("mark_running for unknown job {}", id),
        }
        Ok(())
    }

    async fn set_result(
        &self,
        id: Uuid,
        status: JobStatus,
        result: String,
    ) -> Result<(), StoreError> {
        if !status.is_terminal() {
            return Err(StoreError::NotTerminal(status));
        }
        match self.jobs.get_mut(&id) {
            Some(mut job) if !job.status.is_terminal() => {
                job.status = status;
                job.result = Some(result);
                job.updated_at = Utc::now();
            }
            Some(job) => warn!("job {} already {}, ignoring {} result", id, job.status, status),
            None => warn!("result for unknown job {} dropped", id),
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.get(&id).map(|job| job.value().clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
