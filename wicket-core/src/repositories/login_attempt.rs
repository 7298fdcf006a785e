//! Repository trait for the login attempt store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    attempt::{LoginAttempt, NewLoginAttempt},
};

/// Storage for failed login attempt records.
///
/// Implementations keep an append-only log of attempts. No ordering
/// guarantee is required among records, but the two timestamp predicates
/// must be consistent with each other: a record timestamped exactly at a
/// boundary is neither counted by [`count_attempts_since`] nor deleted by
/// [`delete_attempts_older_than`] for that same boundary value.
///
/// Implementations must be safe for concurrent use; callers issue reads
/// and writes from multiple tasks without additional locking.
///
/// [`count_attempts_since`]: LoginAttemptRepository::count_attempts_since
/// [`delete_attempts_older_than`]: LoginAttemptRepository::delete_attempts_older_than
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync + 'static {
    /// Persist one failed login attempt.
    ///
    /// Returns the created record with its assigned id.
    async fn create_attempt(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt, Error>;

    /// Count attempts for `username` with `occurred_at` strictly after
    /// `since`. An attempt at exactly `since` is excluded.
    async fn count_attempts_since(
        &self,
        username: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, Error>;

    /// Delete attempts with `occurred_at` strictly before `threshold`,
    /// for all usernames. Returns the number of rows removed; calling it
    /// again with the same threshold removes nothing further.
    async fn delete_attempts_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, Error>;
}
