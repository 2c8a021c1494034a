use crate::entities::{Job, JobKind, JobPayload, JobStatus};
use crate::jobs::{JobError, JobRegistry, JobStore, StoreError, SubmitError};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use url::Url;
use uuid::Uuid;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Jobs executing at once. The work is network-bound, so this stays small.
    pub concurrency: usize,
    /// Raw text shorter than this is refused at submission.
    pub min_analysis_chars: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            min_analysis_chars: 200,
        }
    }
}

struct QueuedJob {
    id: Uuid,
    kind: JobKind,
    payload: JobPayload,
}

/// Runs jobs off the request path on a bounded pool of tasks and records
/// their outcome in the job store.
pub struct JobScheduler {
    store: Arc<dyn JobStore>,
    queue: mpsc::UnboundedSender<QueuedJob>,
    semaphore: Arc<Semaphore>,
    config: SchedulerConfig,
    shutdown_token: CancellationToken,
}

impl JobScheduler {
    /// Spawn the dispatcher. Must be called from within a tokio runtime.
    pub fn start(
        store: Arc<dyn JobStore>,
        registry: JobRegistry,
        config: SchedulerConfig,
    ) -> Self {
        let config = SchedulerConfig {
            concurrency: config.concurrency.max(1),
            ..config
        };
        info!(
            "Starting job scheduler - concurrency: {}, min analysis chars: {}",
            config.concurrency, config.min_analysis_chars
        );

        let (queue, receiver) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        let shutdown_token = CancellationToken::new();

        tokio::spawn(
            Self::run_dispatcher(
                store.clone(),
                Arc::new(registry),
                receiver,
                semaphore.clone(),
                shutdown_token.clone(),
            )
            .instrument(info_span!("dispatcher")),
        );

        Self {
            store,
            queue,
            semaphore,
            config,
            shutdown_token,
        }
    }

    /// Validate, record a `pending` job and enqueue it. Returns as soon as
    /// the record exists; it never waits for a free worker.
    pub async fn submit(&self, kind: JobKind, payload: JobPayload) -> Result<Uuid, SubmitError> {
        self.validate(kind, &payload)?;
        if self.shutdown_token.is_cancelled() {
            return Err(SubmitError::ShuttingDown);
        }

        let id = Uuid::new_v4();
        self.store.create(id, kind).await?;

        if self.queue.send(QueuedJob { id, kind, payload }).is_err() {
            error!("Dispatcher is gone, failing job {}", id);
            if let Err(e) = self
                .store
                .set_result(id, JobStatus::Failed, SubmitError::ShuttingDown.to_string())
                .await
            {
                error!("Failed to store result for job {}: {}", id, e);
            }
            return Err(SubmitError::ShuttingDown);
        }

        info!("Submitted {} job {}", kind, id);
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        self.store.get(id).await
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Stop taking work and wait for running jobs to finish. Jobs still
    /// queued stay `pending`.
    pub async fn shutdown(&self) {
        info!("Shutdown initiated, waiting for running jobs to complete...");
        self.shutdown_token.cancel();
        match self
            .semaphore
            .acquire_many(self.config.concurrency as u32)
            .await
        {
            Ok(_permits) => info!("All running jobs completed"),
            Err(e) => warn!("Could not wait for running jobs: {}", e),
        }
    }

    fn validate(&self, kind: JobKind, payload: &JobPayload) -> Result<(), SubmitError> {
        match (kind, payload) {
            (_, JobPayload::Url(url)) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(SubmitError::EmptyUrl);
                }
                let parsed = Url::parse(url).map_err(|e| SubmitError::InvalidUrl(e.to_string()))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(SubmitError::InvalidUrl(format!(
                        "unsupported scheme '{}'",
                        parsed.scheme()
                    )));
                }
                Ok(())
            }
            (JobKind::Analyze, JobPayload::Text(text)) => {
                let chars = text.trim().chars().count();
                if chars < self.config.min_analysis_chars {
                    return Err(SubmitError::TextTooShort {
                        chars,
                        min: self.config.min_analysis_chars,
                    });
                }
                Ok(())
            }
            (JobKind::Extract, JobPayload::Text(_)) => Err(SubmitError::PayloadMismatch {
                kind,
                payload: payload.describe(),
            }),
        }
    }

    /// Job dispatch loop
    async fn run_dispatcher(
        store: Arc<dyn JobStore>,
        registry: Arc<JobRegistry>,
        mut receiver: mpsc::UnboundedReceiver<QueuedJob>,
        semaphore: Arc<Semaphore>,
        shutdown_token: CancellationToken,
    ) {
        while let Some(job) = tokio::select! {
            _ = shutdown_token.cancelled() => None,
            job = receiver.recv() => job,
        } {
            let permit = tokio::select! {
                _ = shutdown_token.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("Worker pool closed: {}", e);
                        break;
                    }
                },
            };
            let store = store.clone();
            let registry = registry.clone();

            // Capture fields for tracing before moving job
            let job_id = job.id;
            let job_kind = job.kind;

            tokio::spawn(
                async move {
                    let _permit = permit; // Hold permit until job completes
                    Self::process_job(store, registry, job).await;
                }
                .instrument(info_span!("job", id = %job_id, kind = %job_kind)),
            );
        }

        info!("Dispatcher shutting down");
    }

    /// Process a single job. Whatever happens, the job ends in exactly one
    /// terminal state.
    async fn process_job(store: Arc<dyn JobStore>, registry: Arc<JobRegistry>, job: QueuedJob) {
        info!("Processing job {}", job.id);

        if let Err(e) = store.mark_running(job.id).await {
            error!("Failed to mark job {} as running: {}", job.id, e);
        }

        let (status, result) = match registry.handler(job.kind) {
            Ok(handler) => {
                let payload = job.payload;
                // A separate task so a panicking handler surfaces as a JoinError.
                let outcome =
                    tokio::spawn(async move { handler.run(&payload).await }.in_current_span())
                        .await;
                match outcome {
                    Ok(Ok(text)) if !text.trim().is_empty() => (JobStatus::Done, text),
                    Ok(Ok(_)) => (JobStatus::Failed, JobError::EmptyResult.to_string()),
                    Ok(Err(e)) => (JobStatus::Failed, e.to_string()),
                    Err(join_error) => {
                        error!("Job {} crashed: {}", job.id, join_error);
                        (JobStatus::Failed, JobError::Panicked.to_string())
                    }
                }
            }
            Err(e) => (JobStatus::Failed, e.to_string()),
        };

        match status {
            JobStatus::Done => info!("Job {} completed successfully", job.id),
            _ => warn!("Job {} failed: {}", job.id, result),
        }

        if let Err(e) = store.set_result(job.id, status, result).await {
            error!("Failed to store result for job {}: {}", job.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{InMemoryJobStore, JobHandler, MockJobStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Behaving(&'static str);

    #[async_trait]
    impl JobHandler for Behaving {
        async fn run(&self, payload: &JobPayload) -> anyhow::Result<String> {
            match self.0 {
                "panic" => panic!("handler exploded"),
                "empty" => Ok("   ".to_string()),
                "fail" => anyhow::bail!("remote said no"),
                _ => Ok(format!("handled {}", payload.describe())),
            }
        }

        fn kind(&self) -> JobKind {
            JobKind::Extract
        }
    }

    struct Slow {
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl JobHandler for Slow {
        async fn run(&self, _payload: &JobPayload) -> anyhow::Result<String> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok("done".to_string())
        }

        fn kind(&self) -> JobKind {
            JobKind::Extract
        }
    }

    fn scheduler_with(handler: impl JobHandler, concurrency: usize) -> JobScheduler {
        let mut registry = JobRegistry::new();
        registry.register(handler);
        JobScheduler::start(
            Arc::new(InMemoryJobStore::new()),
            registry,
            SchedulerConfig {
                concurrency,
                min_analysis_chars: 20,
            },
        )
    }

    async fn wait_terminal(scheduler: &JobScheduler, id: Uuid) -> Job {
        for _ in 0..200 {
            if let Some(job) = scheduler.get(id).await.unwrap()
                && job.status.is_terminal()
            {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never finished", id);
    }

    fn url() -> JobPayload {
        JobPayload::Url("https://example.com/article-a".into())
    }

    #[tokio::test]
    async fn successful_job_is_done() {
        let scheduler = scheduler_with(Behaving("ok"), 2);
        let id = scheduler.submit(JobKind::Extract, url()).await.unwrap();

        let job = wait_terminal(&scheduler, id).await;
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.result.as_deref(), Some("handled url"));
    }

    #[tokio::test]
    async fn panic_is_contained_and_scheduler_keeps_serving() {
        let mut registry = JobRegistry::new();
        registry.register(Behaving("panic"));
        let scheduler = JobScheduler::start(
            Arc::new(InMemoryJobStore::new()),
            registry,
            SchedulerConfig::default(),
        );

        let first = scheduler.submit(JobKind::Extract, url()).await.unwrap();
        let second = scheduler.submit(JobKind::Extract, url()).await.unwrap();

        for id in [first, second] {
            let job = wait_terminal(&scheduler, id).await;
            assert_eq!(job.status, JobStatus::Failed);
            assert_eq!(job.result.as_deref(), Some("Internal error while processing job"));
        }
    }

    #[tokio::test]
    async fn empty_result_fails() {
        let scheduler = scheduler_with(Behaving("empty"), 1);
        let id = scheduler.submit(JobKind::Extract, url()).await.unwrap();

        let job = wait_terminal(&scheduler, id).await;
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.result.as_deref(), Some("Job produced an empty result"));
    }

    #[tokio::test]
    async fn handler_error_message_is_stored() {
        let scheduler = scheduler_with(Behaving("fail"), 1);
        let id = scheduler.submit(JobKind::Extract, url()).await.unwrap();

        let job = wait_terminal(&scheduler, id).await;
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.result.as_deref(), Some("remote said no"));
    }

    #[tokio::test]
    async fn missing_handler_fails_the_job() {
        let scheduler = scheduler_with(Behaving("ok"), 1);
        let text = JobPayload::Text("long enough text for the analysis threshold".into());
        let id = scheduler.submit(JobKind::Analyze, text).await.unwrap();

        let job = wait_terminal(&scheduler, id).await;
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.result.unwrap().contains("No handler registered"));
    }

    #[tokio::test]
    async fn pool_size_bounds_parallel_jobs() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let scheduler = scheduler_with(
            Slow {
                running: running.clone(),
                peak: peak.clone(),
            },
            2,
        );

        let mut ids = Vec::new();
        for _ in 0..6 {
            ids.push(scheduler.submit(JobKind::Extract, url()).await.unwrap());
        }
        for id in ids {
            assert_eq!(wait_terminal(&scheduler, id).await.status, JobStatus::Done);
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn invalid_submissions_never_touch_the_store() {
        let mut store = MockJobStore::new();
        store.expect_create().never();
        let scheduler = JobScheduler::start(
            Arc::new(store),
            JobRegistry::new(),
            SchedulerConfig::default(),
        );

        let short = scheduler
            .submit(JobKind::Analyze, JobPayload::Text("too short".into()))
            .await;
        assert!(matches!(
            short,
            Err(SubmitError::TextTooShort { chars: 9, min: 200 })
        ));

        let empty = scheduler.submit(JobKind::Extract, JobPayload::Url("  ".into())).await;
        assert!(matches!(empty, Err(SubmitError::EmptyUrl)));

        let ftp = scheduler
            .submit(JobKind::Extract, JobPayload::Url("ftp://example.com/x".into()))
            .await;
        assert!(matches!(ftp, Err(SubmitError::InvalidUrl(_))));

        let mismatch = scheduler
            .submit(JobKind::Extract, JobPayload::Text("x".repeat(500)))
            .await;
        assert!(matches!(mismatch, Err(SubmitError::PayloadMismatch { .. })));
    }

    #[tokio::test]
    async fn store_failure_surfaces_at_submit() {
        let mut store = MockJobStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|_, _| Err(StoreError::Database(sqlx::Error::PoolTimedOut)));
        let scheduler = JobScheduler::start(
            Arc::new(store),
            JobRegistry::new(),
            SchedulerConfig::default(),
        );

        let err = scheduler.submit(JobKind::Extract, url()).await.unwrap_err();
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_refused() {
        let scheduler = scheduler_with(Behaving("ok"), 1);
        scheduler.shutdown().await;

        let err = scheduler.submit(JobKind::Extract, url()).await.unwrap_err();
        assert!(matches!(err, SubmitError::ShuttingDown));
    }

    #[tokio::test]
    async fn lost_dispatcher_fails_the_job_even_if_the_store_errors() {
        let mut store = MockJobStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|id, kind| Ok(Job::pending(id, kind)));
        store
            .expect_set_result()
            .withf(|_, status, _| *status == JobStatus::Failed)
            .times(1)
            .returning(|_, _, _| Err(StoreError::Database(sqlx::Error::PoolClosed)));

        let (queue, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let scheduler = JobScheduler {
            store: Arc::new(store),
            queue,
            semaphore: Arc::new(Semaphore::new(1)),
            config: SchedulerConfig::default(),
            shutdown_token: CancellationToken::new(),
        };

        let err = scheduler.submit(JobKind::Extract, url()).await.unwrap_err();
        assert!(matches!(err, SubmitError::ShuttingDown));
    }
}
