// tapcard/src/session/events.rs

use std::sync::mpsc::Sender;

use log::debug;

use crate::client::StatusResult;
use crate::error::ProtocolError;
use crate::radio::{ConnectCompletion, InvalidationReason, LinkError, Tag};
use crate::session::state::Generation;

/// Event reported by the radio link for one session.
#[derive(Debug)]
pub enum RadioEvent {
    /// The radio session is polling.
    SessionActive,
    /// Tags came into the field.
    TagsDetected(Vec<Tag>),
    /// Outcome of a connect request.
    Connected(Result<(), LinkError>),
    /// The radio session ended.
    Invalidated(InvalidationReason),
}

#[derive(Debug)]
pub(crate) enum SessionEvent {
    Radio(RadioEvent),
    ExchangeFinished(Result<StatusResult, ProtocolError>),
}

impl SessionEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            SessionEvent::Radio(RadioEvent::SessionActive) => "session-active",
            SessionEvent::Radio(RadioEvent::TagsDetected(_)) => "tags-detected",
            SessionEvent::Radio(RadioEvent::Connected(_)) => "connected",
            SessionEvent::Radio(RadioEvent::Invalidated(_)) => "invalidated",
            SessionEvent::ExchangeFinished(_) => "exchange-finished",
        }
    }
}

pub(crate) struct Envelope {
    pub(crate) generation: Generation,
    pub(crate) event: SessionEvent,
}

/// Posts events for one session onto the controller's queue.
///
/// Handed to [`RadioLink::begin`](crate::radio::RadioLink::begin); may be
/// cloned and used from any thread. Events posted after the session was
/// superseded are dropped by the controller.
#[derive(Clone, Debug)]
pub struct EventSink {
    generation: Generation,
    tx: Sender<Envelope>,
}

impl EventSink {
    pub(crate) fn new(generation: Generation, tx: Sender<Envelope>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the session this sink posts for.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Post a radio event.
    pub fn post(&self, event: RadioEvent) {
        self.send(SessionEvent::Radio(event));
    }

    /// Shorthand for posting [`RadioEvent::SessionActive`].
    pub fn session_active(&self) {
        self.post(RadioEvent::SessionActive);
    }

    /// Shorthand for posting [`RadioEvent::TagsDetected`].
    pub fn tags_detected(&self, tags: Vec<Tag>) {
        self.post(RadioEvent::TagsDetected(tags));
    }

    /// Shorthand for posting [`RadioEvent::Invalidated`].
    pub fn invalidated(&self, reason: InvalidationReason) {
        self.post(RadioEvent::Invalidated(reason));
    }

    pub(crate) fn connect_completion(&self) -> ConnectCompletion {
        let sink = self.clone();
        Box::new(move |result| sink.post(RadioEvent::Connected(result)))
    }

    pub(crate) fn exchange_finished(&self, result: Result<StatusResult, ProtocolError>) {
        self.send(SessionEvent::ExchangeFinished(result));
    }

    fn send(&self, event: SessionEvent) {
        let name = event.name();
        let envelope = Envelope {
            generation: self.generation,
            event,
        };
        if self.tx.send(envelope).is_err() {
            debug!("{}: controller gone, dropping {}", self.generation, name);
        }
    }
}

/// Status published to the caller of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Polling for a card.
    Scanning,
    /// Card found, connecting.
    Connecting,
    /// Connected, reading status.
    Exchanging,
    /// Status read.
    Succeeded(StatusResult),
    /// Scan failed; carries the user-facing message.
    Failed(String),
    /// Scan cancelled.
    Cancelled,
}

impl ScanEvent {
    /// Whether no further events follow for this scan.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanEvent::Succeeded(_) | ScanEvent::Failed(_) | ScanEvent::Cancelled
        )
    }
}
