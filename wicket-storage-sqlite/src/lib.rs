//! SQLite storage backend for the wicket brute-force login guard.
//!
//! Provides [`SqliteLoginAttemptRepository`] (the durable attempt store),
//! [`SqliteLockService`] (a table-backed distributed lock shared by all
//! instances pointing at the same database), and the schema migrations.

pub mod lock;
pub mod migrations;
pub mod repositories;

pub use lock::SqliteLockService;
pub use migrations::{MigrationError, SqliteMigrationManager, migrate};
pub use repositories::SqliteLoginAttemptRepository;
