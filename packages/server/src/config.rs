//! Session configuration.

use std::time::Duration;

/// Default period of the per-room persistence timer.
pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default upper bound for a single persistence store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for room persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How often each active room is saved. Must be non-zero.
    pub save_interval: Duration,
    /// Store calls taking longer than this are treated as failures.
    pub store_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save_interval: DEFAULT_SAVE_INTERVAL,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}
