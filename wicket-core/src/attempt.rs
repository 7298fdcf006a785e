//! Failed login attempt domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded failed login attempt.
///
/// Immutable once written; rows are only ever created or deleted, never
/// updated. Deletion happens exclusively through the periodic maintenance
/// sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: i64,
    pub username: String,
    pub source_address: String,
    pub occurred_at: DateTime<Utc>,
}

/// Insert command for a new failed login attempt.
///
/// `occurred_at` is stamped by the caller (the service's clock) so that a
/// single "now" sample is used per operation.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub username: String,
    pub source_address: String,
    pub occurred_at: DateTime<Utc>,
}

impl NewLoginAttempt {
    pub fn new(
        username: impl Into<String>,
        source_address: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            source_address: source_address.into(),
            occurred_at,
        }
    }
}
