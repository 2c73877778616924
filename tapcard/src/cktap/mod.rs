// tapcard/src/cktap/mod.rs

//! Status query for Coinkite SATSCARD / TAPSIGNER / SATSCHIP cards.
//!
//! Selecting the card applet returns the card status as a CBOR map; no
//! further command is needed.

mod status;

use log::debug;

use crate::client::{CardProtocolClient, StatusResult};
use crate::error::ProtocolError;
use crate::protocol::Command;
use crate::transport::ApduTransport;

pub use status::decode_status;

/// Applet identifier: `\xF0CoinkiteCARDv1`.
pub const APPLET_AID: [u8; 15] = [
    0xF0, 0x43, 0x6F, 0x69, 0x6E, 0x6B, 0x69, 0x74, 0x65, 0x43, 0x41, 0x52, 0x44, 0x76, 0x31,
];

/// [`CardProtocolClient`] that reads the card status.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusClient;

impl StatusClient {
    /// A status client; it holds no state.
    pub fn new() -> Self {
        Self
    }

    /// `SELECT` of the card applet. The card answers it with its status.
    pub fn select_command() -> Command {
        let mut apdu = vec![0x00, 0xA4, 0x04, 0x00, APPLET_AID.len() as u8];
        apdu.extend_from_slice(&APPLET_AID);
        Command::from_bytes(apdu)
    }
}

impl CardProtocolClient for StatusClient {
    fn status(&self, transport: &mut dyn ApduTransport) -> Result<StatusResult, ProtocolError> {
        let resp = transport.exchange(&Self::select_command())?;
        if !resp.is_success() {
            return Err(ProtocolError::Status(resp.status_word()));
        }
        let status = decode_status(resp.payload())?;
        debug!(
            "card status: proto={} ver={} pubkey={}",
            status.proto,
            status.ver,
            status.pubkey_hex()
        );
        Ok(status)
    }
}
