//! Course selection configuration.

use serde::{Deserialize, Serialize};

/// Settings for the enrollment orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Expiry of the per-course lock entry in seconds.
    ///
    /// The lock is never renewed, so this must comfortably exceed the
    /// slowest expected critical section.
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
    /// Seed every course's stock counter from the database on startup.
    #[serde(default)]
    pub initialize_stocks_on_startup: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            lock_ttl_seconds: default_lock_ttl(),
            initialize_stocks_on_startup: false,
        }
    }
}

fn default_lock_ttl() -> u64 {
    10
}
