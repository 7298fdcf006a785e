//! Guard configuration.

/// Configuration for brute-force login protection.
///
/// Read once at service construction. Disabling protection does not purge
/// existing attempt records; if protection is re-enabled later, records
/// still inside the window count again.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub enabled: bool,
}

impl GuardConfig {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
