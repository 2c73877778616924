// tapcard/src/session/state.rs

use std::fmt;

use derive_more::Display;

use crate::error::SessionError;

/// Identifies one scan session. Every event and callback carries the
/// generation of the session it belongs to; events for any other
/// generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "session#{}", _0)]
pub struct Generation(u64);

impl Generation {
    /// Generation with the given number.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// The raw number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Lifecycle of one card session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Created, radio not started.
    Idle,
    /// Radio session requested, polling for a tag.
    Starting,
    /// A tag was found.
    TagDetected,
    /// Connecting to the tag.
    Connecting,
    /// Status exchange in flight.
    Exchanging,
    /// Status received.
    Succeeded,
    /// Scan ended with an error.
    Failed(SessionError),
    /// Scan cancelled by the user or superseded.
    Cancelled,
}

impl SessionState {
    /// Whether the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Failed(_) | SessionState::Cancelled
        )
    }

    /// Whether `self -> next` is a legal step. Forward steps go strictly in
    /// order; failure and cancellation are reachable from any non-terminal
    /// state; terminal states have no successors.
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, Starting)
            | (Starting, TagDetected)
            | (TagDetected, Connecting)
            | (Connecting, Exchanging)
            | (Exchanging, Succeeded) => true,
            (from, Failed(_) | Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("Idle"),
            SessionState::Starting => f.write_str("Starting"),
            SessionState::TagDetected => f.write_str("TagDetected"),
            SessionState::Connecting => f.write_str("Connecting"),
            SessionState::Exchanging => f.write_str("Exchanging"),
            SessionState::Succeeded => f.write_str("Succeeded"),
            SessionState::Failed(err) => write!(f, "Failed({})", err.reason()),
            SessionState::Cancelled => f.write_str("Cancelled"),
        }
    }
}
