//! Timeout helpers used across the crate.
//!
//! Centralizes the exchange timeout and provides a small conversion helper so
//! configuration can express timeouts in milliseconds.

use std::time::Duration;

/// Time a single APDU exchange may take before the transport gives up.
pub const DEFAULT_EXCHANGE_TIMEOUT_MS: u64 = 15_000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convenience: default exchange timeout as Duration.
pub fn default_exchange_timeout() -> Duration {
    ms(DEFAULT_EXCHANGE_TIMEOUT_MS)
}
