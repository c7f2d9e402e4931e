//! `PostgreSQL` content store.
//!
//! ## Table
//!
//! `content (key TEXT PRIMARY KEY, value JSONB NOT NULL, updated_at TIMESTAMPTZ)`

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::{ContentStore, RepositoryError, UpdateFn};
use crate::error::AppError;

/// Content store backed by the `content` table.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const UPSERT: &str = r"
    INSERT INTO content (key, value, updated_at)
    VALUES ($1, $2, NOW())
    ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
";

#[async_trait]
impl ContentStore for PgContentStore {
    async fn read(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let value = sqlx::query_scalar::<_, Value>("SELECT value FROM content WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn write(&self, key: &str, value: &Value) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update(&self, key: &str, f: UpdateFn) -> Result<Value, AppError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // Row locks cannot cover a key that has no row yet
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        let current = sqlx::query_scalar::<_, Value>(
            "SELECT value FROM content WHERE key = $1 FOR UPDATE",
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        // Dropping the transaction on error rolls it back
        let next = f(current)?;

        sqlx::query(UPSERT)
            .bind(key)
            .bind(&next)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;
        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(next)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
