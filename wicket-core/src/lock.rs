//! Cluster-wide mutual exclusion for maintenance work.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use chrono::Duration;

use crate::Error;

/// Boxed future executed while the lock is held.
pub type LockAction<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Result of a successful [`DistributedLock::lock_and_execute`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lock was acquired and the action ran to completion.
    Executed,

    /// Another instance holds the lock; the action did not run.
    ///
    /// This is an expected outcome when several instances race for the
    /// same maintenance work. It must not be treated as a failure.
    AlreadyHeld,
}

/// A named mutual-exclusion primitive shared by all cooperating process
/// instances through a common backing store.
///
/// At most one instance executes the action for a given `name` at a time.
/// `max_hold` bounds how long the action may occupy the lock: backings
/// use it as an expiry ceiling so a crashed holder cannot block the name
/// forever.
#[async_trait]
pub trait DistributedLock: Send + Sync + 'static {
    /// Try to take the lock named `name` and, if acquired, run `action`
    /// before releasing it.
    ///
    /// Returns [`LockOutcome::AlreadyHeld`] without running the action
    /// when another instance holds the lock. Errors mean the acquisition
    /// could not even be attempted (backing store unreachable).
    async fn lock_and_execute<'a>(
        &'a self,
        name: &'a str,
        max_hold: Duration,
        action: LockAction<'a>,
    ) -> Result<LockOutcome, Error>;
}
