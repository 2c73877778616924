//! Utilities for tapcard: small, reusable helpers used across the crate.
//!
//! Hex helpers back the diagnostic log lines of the transport and the display
//! helpers of status results; the timeout helpers centralize the exchange
//! timeout.

pub mod hex;
mod sync;
pub mod timeout;

pub use hex::*;
pub use timeout::*;

pub(crate) use sync::lock;
