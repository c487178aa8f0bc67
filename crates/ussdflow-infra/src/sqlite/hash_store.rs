//! SQLite hash store.
//!
//! Implements `HashStore` from `ussdflow-core`. Every (hash key, field) pair
//! is one row of `session_hashes`; batches commit in a single transaction on
//! the writer pool, so a value and its cursor are never observed apart.

use chrono::Utc;
use sqlx::Row;
use ussdflow_core::storage::{HashStore, HashWrite};
use ussdflow_types::error::RepositoryError;

use super::pool::DatabasePool;

const UPSERT_SQL: &str = r#"INSERT INTO session_hashes (hash_key, field, value, updated_at)
   VALUES (?, ?, ?, ?)
   ON CONFLICT (hash_key, field) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#;

/// SQLite-backed implementation of `HashStore`.
#[derive(Clone, Debug)]
pub struct SqliteHashStore {
    pool: DatabasePool,
}

impl SqliteHashStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => RepositoryError::Connection,
        e => RepositoryError::Query(e.to_string()),
    }
}

impl HashStore for SqliteHashStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM session_hashes WHERE hash_key = ? AND field = ?")
            .bind(key)
            .bind(field)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| row.try_get::<String, _>("value"))
            .transpose()
            .map_err(query_error)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(field)
            .bind(value)
            .bind(&now)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(())
    }

    async fn hset_batch(&self, writes: &[HashWrite]) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        for write in writes {
            sqlx::query(UPSERT_SQL)
                .bind(&write.key)
                .bind(&write.field)
                .bind(&write.value)
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)?;
        tracing::trace!(writes = writes.len(), "hash batch committed");
        Ok(())
    }
}
