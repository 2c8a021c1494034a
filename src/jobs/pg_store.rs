use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{Job, JobKind, JobStatus};
use crate::jobs::{JobStore, StoreError};

/// Postgres-backed store. Every transition is a single guarded `UPDATE`, so
/// terminal rows never change once written.
#[derive(Clone)]
pub struct PgJobStore {
    pool: Pool<Postgres>,
}

impl PgJobStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, id: Uuid, kind: JobKind) -> Result<Job, StoreError> {
        let created = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, kind, status)
            VALUES ($1, $2, 'pending')
            ON CONFLICT (id) DO UPDATE
            SET kind = EXCLUDED.kind,
                status = 'pending',
                result = NULL,
                updated_at = now()
            WHERE jobs.status = 'pending'
            RETURNING id, kind, status, result, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        match created {
            Some(job) => Ok(job),
            None => {
                warn!("job {} is past pending, keeping existing record", id);
                self.get(id)
                    .await?
                    .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
            }
        }
    }

    async fn mark_running(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'running',
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("job {} was not pending, not marking running", id);
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

        let updated = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2,
                result = $3,
                updated_at = now()
            WHERE id = $1 AND status IN ('pending', 'running')
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(result)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            warn!("job {} unknown or already terminal, {} result dropped", id, status);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, kind, status, result, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn terminal_rows_are_immutable(pool: Pool<Postgres>) {
        let store = PgJobStore::new(pool);
        let id = Uuid::new_v4();

        store.create(id, JobKind::Extract).await.unwrap();
        store.mark_running(id).await.unwrap();
        store
            .set_result(id, JobStatus::Done, "article text".into())
            .await
            .unwrap();
        store
            .set_result(id, JobStatus::Failed, "too late".into())
            .await
            .unwrap();
        let again = store.create(id, JobKind::Extract).await.unwrap();

        assert_eq!(again.status, JobStatus::Done);
        assert_eq!(again.result.as_deref(), Some("article text"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn duplicate_create_never_rewinds_running_rows(pool: Pool<Postgres>) {
        let store = PgJobStore::new(pool);
        let id = Uuid::new_v4();

        store.create(id, JobKind::Extract).await.unwrap();
        let refreshed = store.create(id, JobKind::Analyze).await.unwrap();
        assert_eq!(refreshed.kind, JobKind::Analyze);

        store.mark_running(id).await.unwrap();
        let again = store.create(id, JobKind::Extract).await.unwrap();

        assert_eq!(again.status, JobStatus::Running);
        assert_eq!(again.kind, JobKind::Analyze);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn unknown_ids_read_as_none(pool: Pool<Postgres>) {
        let store = PgJobStore::new(pool);
        store.ping().await.unwrap();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
