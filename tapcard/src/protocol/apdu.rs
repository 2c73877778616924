// tapcard/src/protocol/apdu.rs

use derive_more::Display;
use thiserror::Error;

use crate::utils::encode_hex;

/// Failure to build a command APDU.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApduError {
    /// Data longer than a one-byte Lc can describe.
    #[error("command data of {0} bytes exceeds the 255-byte short APDU limit")]
    DataTooLong(usize),
}

/// Two trailing bytes of a card response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{:04x}", _0)]
pub struct StatusWord(u16);

impl StatusWord {
    /// `90 00`, card-level success.
    pub const SUCCESS: Self = Self(0x9000);

    /// Status word from its 16-bit value.
    pub const fn new(sw: u16) -> Self {
        Self(sw)
    }

    /// Status word from its two bytes.
    pub const fn from_bytes(sw1: u8, sw2: u8) -> Self {
        Self(((sw1 as u16) << 8) | sw2 as u16)
    }

    /// 16-bit value, `sw1` in the high byte.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// First status byte.
    pub fn sw1(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Second status byte.
    pub fn sw2(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Whether this is `90 00`.
    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }
}

/// One command APDU. The transport treats it as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(Vec<u8>);

impl Command {
    /// Wrap already-encoded command bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Build a short-form case 3 APDU (`CLA INS P1 P2 Lc data`), or a case 1
    /// APDU when `data` is empty. Data over 255 bytes is rejected with
    /// [`ApduError::DataTooLong`]; use [`Command::from_bytes`] for
    /// extended-length forms.
    pub fn with_data(
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
    ) -> Result<Self, ApduError> {
        let lc = u8::try_from(data.len()).map_err(|_| ApduError::DataTooLong(data.len()))?;
        let mut out = Vec::with_capacity(5 + data.len());
        out.extend_from_slice(&[cla, ins, p1, p2]);
        if lc > 0 {
            out.push(lc);
            out.extend_from_slice(data);
        }
        Ok(Self(out))
    }

    /// `SELECT` by application identifier.
    pub fn select(aid: &[u8]) -> Result<Self, ApduError> {
        Self::with_data(0x00, 0xA4, 0x04, 0x00, aid)
    }

    /// Encoded command bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the encoded command bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Lowercase hex of the command, as logged.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}

impl From<Vec<u8>> for Command {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// One response APDU: data payload followed by the two status-word bytes.
///
/// The status word is carried, never validated; a non-success status word
/// is the protocol client's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response(Vec<u8>);

impl Response {
    /// Reassemble a response from a split wire reply.
    pub fn from_parts(payload: &[u8], sw1: u8, sw2: u8) -> Self {
        let mut out = Vec::with_capacity(payload.len() + 2);
        out.extend_from_slice(payload);
        out.push(sw1);
        out.push(sw2);
        Self(out)
    }

    /// Wrap raw response bytes. Returns `None` if fewer than two bytes are
    /// given, since there would be no status word.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.len() < 2 { None } else { Some(Self(bytes)) }
    }

    /// The trailing two bytes.
    pub fn status_word(&self) -> StatusWord {
        let n = self.0.len();
        StatusWord::from_bytes(self.0[n - 2], self.0[n - 1])
    }

    /// Response data without the status word.
    pub fn payload(&self) -> &[u8] {
        &self.0[..self.0.len() - 2]
    }

    /// Whether the status word is `90 00`.
    pub fn is_success(&self) -> bool {
        self.status_word().is_success()
    }

    /// Payload followed by the status word.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take payload and status word as one buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Lowercase hex of the whole response, as logged.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}
