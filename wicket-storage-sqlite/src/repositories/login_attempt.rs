//! SQLite implementation of the login attempt repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use wicket_core::{
    Error,
    attempt::{LoginAttempt, NewLoginAttempt},
    error::StorageError,
    repositories::LoginAttemptRepository,
};

/// SQLite-backed store for failed login attempts.
///
/// Timestamps are persisted as unix epoch seconds. Window and retention
/// predicates are strict comparisons, so a record sitting exactly on a
/// boundary is neither counted nor deleted for that boundary value.
pub struct SqliteLoginAttemptRepository {
    pool: SqlitePool,
}

impl SqliteLoginAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteLoginAttempt {
    id: i64,
    username: String,
    source_address: String,
    occurred_at: i64,
}

impl From<SqliteLoginAttempt> for LoginAttempt {
    fn from(row: SqliteLoginAttempt) -> Self {
        LoginAttempt {
            id: row.id,
            username: row.username,
            source_address: row.source_address,
            occurred_at: DateTime::from_timestamp(row.occurred_at, 0).expect("Invalid timestamp"),
        }
    }
}

#[async_trait]
impl LoginAttemptRepository for SqliteLoginAttemptRepository {
    async fn create_attempt(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt, Error> {
        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            INSERT INTO login_attempts (username, source_address, occurred_at)
            VALUES (?, ?, ?)
            RETURNING id, username, source_address, occurred_at
            "#,
        )
        .bind(&attempt.username)
        .bind(&attempt.source_address)
        .bind(attempt.occurred_at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record login attempt");
            StorageError::Database("Failed to record login attempt".to_string())
        })?;

        Ok(row.into())
    }

    async fn count_attempts_since(
        &self,
        username: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM login_attempts
            WHERE username = ? AND occurred_at > ?
            "#,
        )
        .bind(username)
        .bind(since.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count login attempts");
            StorageError::Database("Failed to count login attempts".to_string())
        })?;

        Ok(count)
    }

    async fn delete_attempts_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE occurred_at < ?")
            .bind(threshold.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete old login attempts");
                StorageError::Database("Failed to delete old login attempts".to_string())
            })?;

        Ok(result.rows_affected())
    }
}
