//! Distributed lock backed by a `distributed_locks` table.
//!
//! All process instances pointing at the same database cooperate through
//! one row per lock name. An acquisition succeeds only when the row is
//! absent or the previous holder's expiry has passed, so a crashed holder
//! cannot block the name beyond its hold ceiling.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use sqlx::SqlitePool;
use uuid::Uuid;
use wicket_core::{
    Error,
    clock::{Clock, SystemClock},
    error::LockError,
    lock::{DistributedLock, LockAction, LockOutcome},
};

/// SQLite implementation of [`DistributedLock`].
pub struct SqliteLockService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteLockService {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    /// Create a lock service with an injected clock, so expiry can be
    /// driven deterministically in tests.
    pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Upsert the lock row. The update arm only fires when the existing
    /// row has expired, so `rows_affected == 1` means we own the lock.
    async fn try_acquire(&self, name: &str, holder: &str, max_hold: Duration) -> Result<bool, Error> {
        let now = self.clock.now().timestamp();
        let expires_at = now + max_hold.num_seconds();

        let result = sqlx::query(
            r#"
            INSERT INTO distributed_locks (name, holder, acquired_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                holder = excluded.holder,
                acquired_at = excluded.acquired_at,
                expires_at = excluded.expires_at
            WHERE distributed_locks.expires_at <= excluded.acquired_at
            "#,
        )
        .bind(name)
        .bind(holder)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, name, "Failed to acquire distributed lock");
            LockError::Acquisition(e.to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }

    /// Drop our own acquisition only; another holder's row stays intact.
    /// If the delete fails the row still expires at the hold ceiling.
    async fn release(&self, name: &str, holder: &str) {
        let result = sqlx::query("DELETE FROM distributed_locks WHERE name = ? AND holder = ?")
            .bind(name)
            .bind(holder)
            .execute(&self.pool)
            .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, name, "Failed to release distributed lock");
        }
    }
}

#[async_trait]
impl DistributedLock for SqliteLockService {
    async fn lock_and_execute<'a>(
        &'a self,
        name: &'a str,
        max_hold: Duration,
        action: LockAction<'a>,
    ) -> Result<LockOutcome, Error> {
        let holder = Uuid::new_v4().to_string();

        if !self.try_acquire(name, &holder, max_hold).await? {
            return Ok(LockOutcome::AlreadyHeld);
        }

        action.await;
        self.release(name, &holder).await;
        Ok(LockOutcome::Executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::migrate;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wicket_core::clock::ManualClock;

    async fn setup_test_db() -> SqlitePool {
        let _ = tracing_subscriber::fmt().try_init();

        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create pool");

        migrate(&pool).await.expect("Failed to run migrations");
        pool
    }

    fn test_clock() -> ManualClock {
        ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    #[tokio::test]
    async fn test_lock_executes_action_and_releases() {
        let pool = setup_test_db().await;
        let service = SqliteLockService::new(pool.clone());

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        let outcome = service
            .lock_and_execute(
                "sweep",
                Duration::minutes(10),
                Box::pin(async move {
                    flag.store(true, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        assert_eq!(outcome, LockOutcome::Executed);
        assert!(ran.load(Ordering::SeqCst));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM distributed_locks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_lock_already_held_skips_action() {
        let pool = setup_test_db().await;
        let clock = test_clock();
        let service = SqliteLockService::with_clock(pool, Arc::new(clock.clone()));

        let acquired = service
            .try_acquire("sweep", "other-instance", Duration::minutes(10))
            .await
            .unwrap();
        assert!(acquired);

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        let outcome = service
            .lock_and_execute(
                "sweep",
                Duration::minutes(10),
                Box::pin(async move {
                    flag.store(true, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        assert_eq!(outcome, LockOutcome::AlreadyHeld);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_expired_lock_is_reclaimed() {
        let pool = setup_test_db().await;
        let clock = test_clock();
        let service = SqliteLockService::with_clock(pool, Arc::new(clock.clone()));

        service
            .try_acquire("sweep", "crashed-instance", Duration::minutes(10))
            .await
            .unwrap();

        clock.advance(Duration::minutes(11));

        let outcome = service
            .lock_and_execute("sweep", Duration::minutes(10), Box::pin(async {}))
            .await
            .unwrap();
        assert_eq!(outcome, LockOutcome::Executed);
    }

    #[tokio::test]
    async fn test_lock_names_are_independent() {
        let pool = setup_test_db().await;
        let service = SqliteLockService::new(pool);

        service
            .try_acquire("sweep", "other-instance", Duration::minutes(10))
            .await
            .unwrap();

        let outcome = service
            .lock_and_execute("other job", Duration::minutes(10), Box::pin(async {}))
            .await
            .unwrap();
        assert_eq!(outcome, LockOutcome::Executed);
    }

    #[tokio::test]
    async fn test_only_one_instance_executes_concurrently() {
        let pool = setup_test_db().await;
        let instance_a = Arc::new(SqliteLockService::new(pool.clone()));
        let instance_b = SqliteLockService::new(pool);

        let (entered_tx, entered_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let a = tokio::spawn({
            let instance_a = Arc::clone(&instance_a);
            async move {
                instance_a
                    .lock_and_execute(
                        "sweep",
                        Duration::minutes(10),
                        Box::pin(async move {
                            entered_tx.send(()).ok();
                            release_rx.await.ok();
                        }),
                    )
                    .await
            }
        });

        // Wait until instance A is inside the critical section.
        entered_rx.await.unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let outcome = instance_b
            .lock_and_execute(
                "sweep",
                Duration::minutes(10),
                Box::pin(async move {
                    flag.store(true, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        assert_eq!(outcome, LockOutcome::AlreadyHeld);
        assert!(!ran.load(Ordering::SeqCst));

        release_tx.send(()).unwrap();
        assert_eq!(a.await.unwrap().unwrap(), LockOutcome::Executed);
    }
}
