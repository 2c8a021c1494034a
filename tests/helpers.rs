#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use newsprobe::{
    acquisition::{Acquire, Acquirer},
    analysis::{AnalysisError, Analyzer},
    config::FetchConfig,
    entities::Job,
    jobs::{
        AnalyzeJobHandler, ExtractJobHandler, InMemoryJobStore, JobRegistry, JobScheduler,
        SchedulerConfig,
    },
};
use uuid::Uuid;

pub const ARTICLE_HTML: &str = include_str!("../src/extractor/tests/fixtures/article.html");

pub const THIN_HTML: &str =
    "<html><head><title>Subscribe</title></head><body><p>Subscribe to keep reading.</p></body></html>";

/// Fetch settings pointing the render and proxy strategies at mock servers.
pub fn fetch_config(render: Option<String>, proxy: Option<String>) -> FetchConfig {
    FetchConfig {
        fetch_timeout: Duration::from_secs(5),
        max_retries: 1,
        retry_base_delay: Duration::from_millis(1),
        render_endpoint: render,
        render_token: None,
        render_timeout: Duration::from_secs(5),
        scraper_key: proxy.as_ref().map(|_| "test-key".to_string()),
        scraper_endpoint: proxy.unwrap_or_else(|| "https://proxy.invalid/".to_string()),
        proxy_timeout: Duration::from_secs(5),
        ..FetchConfig::default()
    }
}

/// Answers with a fixed prefix and the length of what it was given.
pub struct StubAnalyzer;

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, text: &str) -> Result<String, AnalysisError> {
        Ok(format!("analysis of {} chars", text.chars().count()))
    }
}

pub fn scheduler_with(
    store: Arc<InMemoryJobStore>,
    config: &FetchConfig,
    min_analysis_chars: usize,
) -> JobScheduler {
    let acquirer: Arc<dyn Acquire> =
        Arc::new(Acquirer::from_config(config).expect("acquirer should build"));

    let mut registry = JobRegistry::new();
    registry.register(ExtractJobHandler::new(acquirer.clone()));
    registry.register(AnalyzeJobHandler::new(acquirer, Arc::new(StubAnalyzer)));

    JobScheduler::start(
        store,
        registry,
        SchedulerConfig {
            concurrency: 2,
            min_analysis_chars,
        },
    )
}

pub async fn wait_terminal(scheduler: &JobScheduler, id: Uuid) -> Job {
    for _ in 0..500 {
        if let Some(job) = scheduler.get(id).await.expect("store read")
            && job.status.is_terminal()
        {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {} did not reach a terminal status", id);
}
