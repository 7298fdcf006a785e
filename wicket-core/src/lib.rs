//! Core functionality for the wicket brute-force login guard.
//!
//! This crate contains the domain model for failed login attempts, the
//! repository and distributed lock traits that storage backends implement,
//! and the [`LoginAttemptService`] that owns the protection policy: record
//! failed attempts, decide whether an account may currently attempt login,
//! and periodically purge aged-out records under a cluster-wide lock.
//!
//! Storage backends live in separate crates (for example
//! `wicket-storage-sqlite`) and plug in through
//! [`LoginAttemptRepository`] and [`DistributedLock`].

pub mod attempt;
pub mod clock;
pub mod config;
pub mod error;
pub mod lock;
pub mod repositories;
pub mod services;

pub use attempt::{LoginAttempt, NewLoginAttempt};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GuardConfig;
pub use error::Error;
pub use lock::{DistributedLock, LockAction, LockOutcome};
pub use repositories::LoginAttemptRepository;
pub use services::{LoginAttemptService, MaintenanceExit};
