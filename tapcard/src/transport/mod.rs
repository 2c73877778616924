// tapcard/src/transport/mod.rs

//! APDU transports: the exchange contract, the tag-backed blocking bridge
//! and a scripted mock.

/// Scripted transport for tests.
pub mod mock;
/// Async exchange contract and tag transport.
#[cfg(feature = "async")]
pub mod nonblocking;
/// Blocking transport over a connected tag.
pub mod tag;
/// The [`ApduTransport`] contract.
pub mod traits;

pub use mock::MockTransport;
#[cfg(feature = "async")]
pub use nonblocking::{AsyncApduTransport, AsyncCancelHandle, AsyncTagTransport};
pub use tag::{CancelHandle, TagTransport};
pub use traits::ApduTransport;
