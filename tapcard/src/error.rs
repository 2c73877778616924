// tapcard/src/error.rs

use thiserror::Error;

use crate::protocol::StatusWord;
pub use crate::protocol::ApduError;
pub use crate::utils::HexError;

/// Failure of a single APDU exchange. Never retried by the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Radio or I/O failure, including timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The session ended before a response arrived.
    #[error("exchange cancelled")]
    Cancelled,
}

impl TransportError {
    /// The error an exchange returns when no reply arrives in time.
    pub fn timed_out() -> Self {
        TransportError::Transport("timed out".to_string())
    }

    /// Whether this is the [`TransportError::timed_out`] error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Transport(msg) if msg == "timed out")
    }
}

/// Error raised by a card protocol client. The session layer only looks at
/// its display text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// An exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card answered with a status word the client does not accept.
    #[error("card returned status {0}")]
    Status(StatusWord),

    /// The card reported an application-level error.
    #[error("card error {code}: {message}")]
    Card {
        /// Card error code.
        code: u16,
        /// Card error text.
        message: String,
    },

    /// The response payload could not be decoded.
    #[error("malformed card response: {0}")]
    Decode(String),

    /// The card is not one this client can talk to.
    #[error("unsupported card: {0}")]
    Unsupported(String),
}

/// Terminal outcome of a scan session other than success or cancellation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Discovery finished without any tag.
    #[error("no tag detected")]
    NoTag,

    /// Connecting to the tag failed; carries the radio's message.
    #[error("connection failed")]
    ConnectionFailed(String),

    /// The tag is not an ISO 7816 tag.
    #[error("incompatible card")]
    IncompatibleCard,

    /// The protocol client failed; carries its error text.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The radio ended the session on its own.
    #[error("session terminated unexpectedly")]
    UnexpectedTermination,

    /// Any other radio invalidation.
    #[error("radio error: {0}")]
    Radio(String),

    /// The radio could not start a session.
    #[error("radio unavailable: {0}")]
    Unavailable(String),
}

impl SessionError {
    /// Short reason tag, stable across message wording.
    pub fn reason(&self) -> &'static str {
        match self {
            SessionError::NoTag => "no tag",
            SessionError::ConnectionFailed(_) => "connection failed",
            SessionError::IncompatibleCard => "incompatible card",
            SessionError::Protocol(_) => "protocol error",
            SessionError::UnexpectedTermination => "unexpected termination",
            SessionError::Radio(_) => "radio error",
            SessionError::Unavailable(_) => "unavailable",
        }
    }
}

/// Crate-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// See [`TransportError`].
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// See [`ProtocolError`].
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// See [`SessionError`].
    #[error(transparent)]
    Session(#[from] SessionError),

    /// See [`HexError`].
    #[error(transparent)]
    Hex(#[from] HexError),

    /// See [`ApduError`].
    #[error(transparent)]
    Apdu(#[from] ApduError),

    /// A builder was finished without a required part.
    #[error("missing component: {0}")]
    MissingComponent(&'static str),
}

/// Result alias over the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
