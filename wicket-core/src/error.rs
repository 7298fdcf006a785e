use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Failure to interact with the lock backing store at all. A lock that is
/// simply held by another instance is not an error; see
/// [`crate::lock::LockOutcome::AlreadyHeld`].
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to acquire lock: {0}")]
    Acquisition(String),

    #[error("Failed to release lock: {0}")]
    Release(String),
}
