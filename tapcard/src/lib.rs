// tapcard/src/lib.rs

//! tapcard
//!
//! Command transport and scan-session orchestration for contactless
//! Bitcoin cards (SATSCARD, TAPSIGNER). A [`ScanController`] drives one
//! proximity-radio session at a time; once an ISO 7816 tag is connected, a
//! [`TagTransport`] turns the radio's asynchronous send-with-callback API
//! into the blocking `exchange` a [`CardProtocolClient`] expects.
#![warn(missing_docs)]

#[cfg(feature = "cktap")]
pub mod cktap;
/// Card protocol client seam and the status it produces.
pub mod client;
/// Scan configuration.
pub mod config;
/// Error types for each layer.
pub mod error;
/// Commonly used items.
pub mod prelude;
/// APDU data model.
pub mod protocol;
/// Proximity-radio abstraction and its simulated implementation.
pub mod radio;
pub mod session;
pub mod test_support;
/// Blocking and async APDU transports.
pub mod transport;
pub mod utils;
pub mod wallet;

pub use crate::error::*;

pub use prelude::*;
