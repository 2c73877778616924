// tapcard/src/radio/traits.rs

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::SessionConfig;
use crate::session::EventSink;
use crate::utils::encode_hex;

/// Error reported by the radio link itself (connect failure, send failure).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LinkError(String);

impl LinkError {
    /// Link error carrying the radio's message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The radio's message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A card reply as the radio link delivers it: payload and status word
/// arrive separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireReply {
    /// Response data.
    pub payload: Vec<u8>,
    /// First status byte.
    pub sw1: u8,
    /// Second status byte.
    pub sw2: u8,
}

impl WireReply {
    /// Reply with an explicit status word.
    pub fn new(payload: impl Into<Vec<u8>>, sw1: u8, sw2: u8) -> Self {
        Self {
            payload: payload.into(),
            sw1,
            sw2,
        }
    }

    /// Reply with status word `90 00`.
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(payload, 0x90, 0x00)
    }
}

/// Callback receiving the reply to one command.
pub type ReplyCompletion = Box<dyn FnOnce(Result<WireReply, LinkError>) + Send + 'static>;
/// Callback receiving the result of a connect.
pub type ConnectCompletion = Box<dyn FnOnce(Result<(), LinkError>) + Send + 'static>;

/// A connected ISO 7816 tag. Commands are asynchronous: `send_command`
/// returns immediately and the completion is invoked later, possibly on
/// another thread. At most one command may be in flight per tag.
pub trait TagLink: Send + Sync {
    /// Tag identifier (UID), used for diagnostics only.
    fn identifier(&self) -> Vec<u8>;

    /// Send one command APDU; `completion` receives the reply or link error.
    fn send_command(&self, apdu: &[u8], completion: ReplyCompletion);
}

/// A tag reported by the radio link during discovery.
#[derive(Clone)]
pub enum Tag {
    /// ISO 7816 tag, the only family that can carry APDUs.
    Iso7816(Arc<dyn TagLink>),
    /// FeliCa tag.
    FeliCa {
        /// Manufacture ID.
        idm: Vec<u8>,
    },
    /// ISO 15693 (vicinity) tag.
    Iso15693 {
        /// Tag UID.
        identifier: Vec<u8>,
    },
    /// MIFARE tag.
    Mifare {
        /// Tag UID.
        identifier: Vec<u8>,
    },
}

impl Tag {
    /// Protocol family name, as logged.
    pub fn kind(&self) -> &'static str {
        match self {
            Tag::Iso7816(_) => "iso7816",
            Tag::FeliCa { .. } => "felica",
            Tag::Iso15693 { .. } => "iso15693",
            Tag::Mifare { .. } => "mifare",
        }
    }

    /// Tag UID (IDm for FeliCa).
    pub fn identifier(&self) -> Vec<u8> {
        match self {
            Tag::Iso7816(link) => link.identifier(),
            Tag::FeliCa { idm } => idm.clone(),
            Tag::Iso15693 { identifier } | Tag::Mifare { identifier } => identifier.clone(),
        }
    }

    /// The link for ISO 7816 tags; `None` for every other protocol family.
    pub fn iso7816(&self) -> Option<&Arc<dyn TagLink>> {
        match self {
            Tag::Iso7816(link) => Some(link),
            _ => None,
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), encode_hex(&self.identifier()))
    }
}

/// Why the radio ended a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The user dismissed the scan.
    UserCanceled,
    /// The radio dropped the session.
    SessionTerminatedUnexpectedly,
    /// The radio's own session time limit ran out.
    SessionTimeout,
    /// The radio is in use elsewhere.
    SystemBusy,
    /// Any other reason, with the radio's message.
    Other(String),
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationReason::UserCanceled => f.write_str("session invalidated by user"),
            InvalidationReason::SessionTerminatedUnexpectedly => {
                f.write_str("session terminated unexpectedly")
            }
            InvalidationReason::SessionTimeout => f.write_str("session timeout"),
            InvalidationReason::SystemBusy => f.write_str("system resource unavailable"),
            InvalidationReason::Other(msg) => f.write_str(msg),
        }
    }
}

/// Which radio technologies a scan polls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PollingTarget {
    /// ISO 14443 type A/B, which ISO 7816 cards use.
    Iso14443,
    /// ISO 15693 vicinity cards.
    Iso15693,
    /// ISO 18092 / FeliCa.
    Iso18092,
}

/// Proximity-radio reader session API.
///
/// Implementations deliver session events through the [`EventSink`] given
/// to `begin`, from any thread. Only one radio session exists at a time;
/// `connect` and `invalidate` address the session most recently begun.
pub trait RadioLink: Send {
    /// Start polling. The sink is tagged with the new session's generation.
    fn begin(&mut self, config: &SessionConfig, sink: EventSink) -> Result<(), LinkError>;

    /// Connect to a discovered tag, reporting the result to `completion`.
    fn connect(&mut self, tag: &Tag, completion: ConnectCompletion);

    /// End the current session. `error_message` is shown to the user by
    /// radios that display one; `None` ends the session normally.
    fn invalidate(&mut self, error_message: Option<&str>);
}
