// tapcard/src/protocol/mod.rs

/// Command and response APDUs and status words.
pub mod apdu;

pub use apdu::{ApduError, Command, Response, StatusWord};
