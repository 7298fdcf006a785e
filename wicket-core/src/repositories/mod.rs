//! Repository traits for the data access layer.
//!
//! These traits abstract over the underlying storage implementation so the
//! service layer never depends on a concrete backend.

pub mod login_attempt;

pub use login_attempt::LoginAttemptRepository;
