//! PostgreSQL-backed storage using the `broker_storage` table.

use async_trait::async_trait;
use sqlx::PgPool;

use broker_application::SecretStorage;
use broker_core::{AppError, AppResult};

/// PostgreSQL implementation of the storage port.
#[derive(Clone)]
pub struct PostgresSecretStorage {
    pool: PgPool,
}

impl PostgresSecretStorage {
    /// Creates storage with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecretStorage for PostgresSecretStorage {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        sqlx::query_scalar::<_, Vec<u8>>(
            r#"
            SELECT value
            FROM broker_storage
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read storage key '{key}': {error}")))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO broker_storage (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to write storage key '{key}': {error}"))
        })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM broker_storage
            WHERE key = $1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete storage key '{key}': {error}"))
        })?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>(
            r#"
            SELECT key
            FROM broker_storage
            WHERE starts_with(key, $1)
            ORDER BY key
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list storage prefix '{prefix}': {error}"))
        })?;

        Ok(crate::child_names(prefix, keys.iter().map(String::as_str)))
    }
}
