//! Brute-force login protection service.
//!
//! Tracks failed login attempts per account and refuses further logins
//! once a ceiling of failures is reached inside a sliding time window.
//! A background maintenance loop periodically deletes aged-out attempt
//! records; a distributed lock guarantees that at most one instance in a
//! cluster runs the sweep at a time.
//!
//! # Example
//!
//! ```rust,ignore
//! use wicket_core::{GuardConfig, LoginAttemptService};
//!
//! let service = Arc::new(LoginAttemptService::new(repository, lock, GuardConfig::default()));
//!
//! // On a failed login:
//! service.record_attempt("alice", "192.0.2.10").await?;
//!
//! // Before accepting a login:
//! if !service.is_login_allowed("alice").await? {
//!     // Refuse the attempt.
//! }
//!
//! // Once per process, as a supervised background task:
//! let handle = service.clone().start_maintenance(shutdown_rx);
//! ```

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    Error,
    attempt::NewLoginAttempt,
    clock::{Clock, SystemClock},
    config::GuardConfig,
    lock::{DistributedLock, LockOutcome},
    repositories::LoginAttemptRepository,
};

/// Failed attempts per account allowed inside the sliding window before
/// further logins are refused. A count equal to the ceiling refuses.
pub const MAX_FAILED_ATTEMPTS: i64 = 5;

/// Width of the sliding window consulted by `is_login_allowed`.
const ATTEMPT_WINDOW_MINUTES: i64 = 5;

/// Tick interval of the maintenance loop. Also the retention cutoff for
/// the sweep and the hold ceiling on the cleanup lock; the three are
/// deliberately one constant.
const MAINTENANCE_INTERVAL_MINUTES: i64 = 10;

/// Name under which the cleanup sweep takes the distributed lock.
const CLEANUP_LOCK_NAME: &str = "delete old login attempts";

/// Why [`LoginAttemptService::run_maintenance`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceExit {
    /// Protection is disabled; there is no periodic work to do.
    Disabled,

    /// The shutdown signal fired, or its sender was dropped.
    Cancelled,
}

/// Service owning the brute-force protection policy.
///
/// Thread-safe; share it across tasks behind an [`Arc`]. Request-path
/// methods never touch the distributed lock and never block on the
/// maintenance sweep.
pub struct LoginAttemptService<R: LoginAttemptRepository, L: DistributedLock> {
    repository: Arc<R>,
    lock: Arc<L>,
    clock: Arc<dyn Clock>,
    config: GuardConfig,
}

impl<R: LoginAttemptRepository, L: DistributedLock> LoginAttemptService<R, L> {
    pub fn new(repository: Arc<R>, lock: Arc<L>, config: GuardConfig) -> Self {
        Self::with_clock(repository, lock, config, Arc::new(SystemClock))
    }

    /// Create a service with an injected clock so window logic can be
    /// driven deterministically in tests.
    pub fn with_clock(
        repository: Arc<R>,
        lock: Arc<L>,
        config: GuardConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            lock,
            clock,
            config,
        }
    }

    /// Check if brute-force protection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record one failed login attempt for `username`.
    ///
    /// No-op when protection is disabled. Store errors propagate to the
    /// caller unchanged; swallowing them here would wrongly admit or
    /// wrongly block logins.
    pub async fn record_attempt(&self, username: &str, source_address: &str) -> Result<(), Error> {
        if !self.config.enabled {
            return Ok(());
        }

        let attempt = NewLoginAttempt::new(username, source_address, self.clock.now());
        self.repository.create_attempt(&attempt).await?;
        Ok(())
    }

    /// Whether `username` may currently attempt a login.
    ///
    /// Counts attempts strictly inside the trailing window, measured from
    /// a single "now" sample taken at call time. Always true when
    /// protection is disabled.
    pub async fn is_login_allowed(&self, username: &str) -> Result<bool, Error> {
        if !self.config.enabled {
            return Ok(true);
        }

        let since = self.clock.now() - Duration::minutes(ATTEMPT_WINDOW_MINUTES);
        let count = self.repository.count_attempts_since(username, since).await?;
        Ok(count < MAX_FAILED_ATTEMPTS)
    }

    /// Periodic maintenance loop. Run once per process instance.
    ///
    /// Returns immediately when protection is disabled (checked once, at
    /// startup). Otherwise wakes on a fixed interval and runs one cleanup
    /// sweep per tick. Sweep and lock failures are logged and the loop
    /// continues; only the shutdown signal terminates it. An in-flight
    /// sweep finishes before cancellation is honored, since it holds an
    /// external lock.
    pub async fn run_maintenance(&self, mut shutdown: watch::Receiver<bool>) -> MaintenanceExit {
        if !self.config.enabled {
            return MaintenanceExit::Disabled;
        }

        let period = std::time::Duration::from_secs(MAINTENANCE_INTERVAL_MINUTES as u64 * 60);
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("Shutting down login attempt maintenance");
                    return MaintenanceExit::Cancelled;
                }
            }
        }
    }

    /// Spawn [`run_maintenance`](Self::run_maintenance) as a supervised
    /// background task.
    pub fn start_maintenance(
        self: Arc<Self>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<MaintenanceExit> {
        tokio::spawn(async move { self.run_maintenance(shutdown).await })
    }

    /// One cleanup cycle: take the cluster lock and delete aged-out
    /// attempt records. The retention threshold is computed once per
    /// cycle so the predicate cannot skew mid-operation.
    async fn sweep(&self) {
        let threshold = self.clock.now() - Duration::minutes(MAINTENANCE_INTERVAL_MINUTES);
        let repository = Arc::clone(&self.repository);

        let outcome = self
            .lock
            .lock_and_execute(
                CLEANUP_LOCK_NAME,
                Duration::minutes(MAINTENANCE_INTERVAL_MINUTES),
                Box::pin(async move {
                    match repository.delete_attempts_older_than(threshold).await {
                        Ok(deleted) => {
                            tracing::debug!(rows = deleted, "Deleted expired login attempts");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Problem deleting expired login attempts");
                        }
                    }
                }),
            )
            .await;

        match outcome {
            Ok(LockOutcome::Executed) => {}
            Ok(LockOutcome::AlreadyHeld) => {
                tracing::debug!("Another instance is already cleaning up login attempts");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock and execute login attempt cleanup");
            }
        }
    }
}
