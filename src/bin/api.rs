use std::sync::Arc;

use anyhow::{Context, Result};
use newsprobe::{
    acquisition::{Acquire, Acquirer},
    analysis,
    api,
    app_state::AppState,
    config::Config,
    jobs::{
        AnalyzeJobHandler, ExtractJobHandler, InMemoryJobStore, JobRegistry, JobScheduler,
        JobStore, PgJobStore, SchedulerConfig,
    },
    telemetry,
};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init("newsprobe=info,tower_http=info,warn");

    let config = Config::from_env().context("Failed to load configuration")?;

    let store: Arc<dyn JobStore> = match config.database_url() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("Failed to connect to the job database")?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Using Postgres job store");
            Arc::new(PgJobStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, jobs are kept in memory and lost on restart");
            Arc::new(InMemoryJobStore::new())
        }
    };

    let acquirer: Arc<dyn Acquire> = Arc::new(Acquirer::from_config(config.fetch())?);
    let analyzer = analysis::from_config(config.analysis())?;

    let mut registry = JobRegistry::new();
    registry.register(ExtractJobHandler::new(acquirer.clone()));
    registry.register(AnalyzeJobHandler::new(acquirer, analyzer));

    let scheduler = Arc::new(JobScheduler::start(
        store,
        registry,
        SchedulerConfig {
            concurrency: config.worker_concurrency(),
            min_analysis_chars: config.min_analysis_chars(),
        },
    ));

    let app = api::router(AppState::new(scheduler.clone()));
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Received shutdown signal, initiating graceful shutdown...");
}
