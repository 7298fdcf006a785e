//! Service layer for business logic.

pub mod login_attempt;

pub use login_attempt::{LoginAttemptService, MaintenanceExit};
