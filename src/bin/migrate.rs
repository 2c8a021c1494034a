use anyhow::{Context, Result};
use newsprobe::{config::Config, telemetry};
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init("info");

    let config = Config::from_env()?;
    let db_url = config
        .database_url()
        .context("DATABASE_URL environment variable not set")?;

    let pool: Pool<Postgres> = PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    // runs all pending migrations; no-op if up-to-date
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied");

    Ok(())
}
