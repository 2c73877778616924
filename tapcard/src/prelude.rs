// tapcard/src/prelude.rs

#[cfg(feature = "cktap")]
pub use crate::cktap::StatusClient;
pub use crate::client::{CardKind, CardProtocolClient, StatusResult};
pub use crate::config::SessionConfig;
pub use crate::protocol::{Command, Response, StatusWord};
pub use crate::radio::{InvalidationReason, LinkError, RadioLink, Tag, TagLink, WireReply};
pub use crate::session::{EventSink, Generation, ScanController, ScanEvent, SessionState};
pub use crate::transport::{ApduTransport, CancelHandle, TagTransport};
pub use crate::{Error, ProtocolError, Result, SessionError, TransportError};

// Re-export small utilities for convenience
pub use crate::utils::{decode_hex, default_exchange_timeout, encode_hex, ms};
