// tapcard/src/session/controller.rs

//! Scan orchestration.
//!
//! The controller owns the radio link and at most one [`CardSession`].
//! Radio callbacks, connect completions and protocol-client results are all
//! posted as generation-tagged envelopes onto one queue, and the controller
//! applies them serially on whichever thread calls [`ScanController::pump`]
//! or [`ScanController::process_until_terminal`]. Envelopes whose generation
//! is not the current session's are discarded, as is everything except the
//! closing invalidation once the session is terminal.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::client::{CardProtocolClient, StatusResult};
use crate::config::SessionConfig;
use crate::error::{Error, ProtocolError, Result, SessionError};
use crate::radio::{InvalidationReason, LinkError, RadioLink, Tag};
use crate::session::card_session::CardSession;
use crate::session::events::{Envelope, EventSink, RadioEvent, ScanEvent, SessionEvent};
use crate::session::state::{Generation, SessionState};
use crate::transport::TagTransport;

/// Status message before any scan.
pub const IDLE_MESSAGE: &str = "Tap to scan card";
/// Status message while polling.
pub const SCANNING_MESSAGE: &str = "Scanning for card...";
/// Status message once a tag is found.
pub const CONNECTING_MESSAGE: &str = "Card detected, connecting...";
/// Status message during the status exchange.
pub const EXCHANGING_MESSAGE: &str = "Card connected, getting status...";
/// Status message after a successful read.
pub const SUCCEEDED_MESSAGE: &str = "Card status received.";
/// Status message after cancellation.
pub const CANCELLED_MESSAGE: &str = "Scan cancelled.";

// Messages the radio shows when a session is invalidated with an error.
const NO_TAG_ALERT: &str = "Could not detect tag.";
const CONNECTION_ALERT: &str = "Connection failed.";
const INCOMPATIBLE_ALERT: &str = "Card not compatible.";
const CARD_ERROR_ALERT: &str = "Card error.";

/// Caller-facing status: published events plus the flags a UI polls.
struct StatusBoard {
    subscribers: Vec<Sender<ScanEvent>>,
    message: String,
    scanning: bool,
    last_status: Option<StatusResult>,
}

impl StatusBoard {
    fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            message: IDLE_MESSAGE.to_string(),
            scanning: false,
            last_status: None,
        }
    }

    /// Show a new scan as polling without publishing anything; the radio's
    /// session-active report publishes `Scanning`.
    fn restart(&mut self) {
        self.message = SCANNING_MESSAGE.to_string();
        self.scanning = true;
    }

    fn update(&mut self, message: impl Into<String>, event: ScanEvent) {
        self.message = message.into();
        self.scanning = !event.is_terminal();
        if let ScanEvent::Succeeded(status) = &event {
            self.last_status = Some(status.clone());
        }
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Runs card scans against a radio link and a protocol client.
pub struct ScanController {
    radio: Box<dyn RadioLink>,
    client: Arc<dyn CardProtocolClient>,
    config: SessionConfig,
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    session: Option<CardSession>,
    last_generation: u64,
    board: StatusBoard,
}

impl ScanController {
    /// Controller with no session; call [`begin_scan`](Self::begin_scan) to start one.
    pub fn new(
        radio: Box<dyn RadioLink>,
        client: Arc<dyn CardProtocolClient>,
        config: SessionConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            radio,
            client,
            config,
            tx,
            rx,
            session: None,
            last_generation: 0,
            board: StatusBoard::new(),
        }
    }

    /// Start building a controller.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    /// Receive every [`ScanEvent`] published from now on.
    pub fn subscribe(&mut self) -> Receiver<ScanEvent> {
        let (tx, rx) = mpsc::channel();
        self.board.subscribers.push(tx);
        rx
    }

    /// Message describing the current scan, for display.
    pub fn status_message(&self) -> &str {
        &self.board.message
    }

    /// Whether a scan is in progress.
    pub fn is_scanning(&self) -> bool {
        self.board.scanning
    }

    /// Most recent successful status read, across sessions.
    pub fn last_status(&self) -> Option<&StatusResult> {
        self.board.last_status.as_ref()
    }

    /// Generation of the current session, if any.
    pub fn generation(&self) -> Option<Generation> {
        self.session.as_ref().map(CardSession::generation)
    }

    /// Lifecycle state of the current session, if any.
    pub fn state(&self) -> Option<&SessionState> {
        self.session.as_ref().map(CardSession::state)
    }

    /// Start a new scan, tearing down the previous session first.
    pub fn begin_scan(&mut self) -> Generation {
        if let Some(old) = self.session.take() {
            self.retire(old);
        }
        self.board.restart();

        self.last_generation += 1;
        let generation = Generation::new(self.last_generation);
        let mut session = CardSession::new(generation);
        session.transition(SessionState::Starting);
        info!("{}: starting scan", generation);

        let sink = EventSink::new(generation, self.tx.clone());
        let begun = self.radio.begin(&self.config, sink);
        if begun.is_ok() {
            session.mark_radio_live();
        }
        self.session = Some(session);

        if let Err(e) = begun {
            self.fail(SessionError::Unavailable(e.message().to_string()), "");
        }
        generation
    }

    /// Cancel the active scan on the caller's behalf.
    pub fn cancel_scan(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state().is_terminal() {
            return;
        }
        session.cancel_exchange();
        session.transition(SessionState::Cancelled);
        info!("{}: scan cancelled by caller", session.generation());
        let close = session.close_radio();
        self.board.update(CANCELLED_MESSAGE, ScanEvent::Cancelled);
        if close {
            self.radio.invalidate(None);
        }
    }

    /// Apply every queued event without blocking. Returns how many were
    /// processed.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            self.dispatch(envelope);
            n += 1;
        }
        n
    }

    /// Apply events as they arrive until the active session is terminal or
    /// `timeout` elapses. Returns the terminal state, or `None` on timeout
    /// or when no session exists.
    pub fn process_until_terminal(&mut self, timeout: Duration) -> Option<SessionState> {
        // a timeout too large to represent as an Instant waits without limit
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let state = self.state()?;
            if state.is_terminal() {
                return Some(state.clone());
            }
            let envelope = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    match self.rx.recv_timeout(deadline - now) {
                        Ok(envelope) => envelope,
                        Err(RecvTimeoutError::Timeout) => return None,
                        // the controller holds a sender, so the queue never disconnects
                        Err(RecvTimeoutError::Disconnected) => return None,
                    }
                }
                None => match self.rx.recv() {
                    Ok(envelope) => envelope,
                    Err(_) => return None,
                },
            };
            self.dispatch(envelope);
        }
    }

    fn retire(&mut self, mut old: CardSession) {
        old.cancel_exchange();
        if !old.state().is_terminal() {
            debug!("{}: superseded by a new scan", old.generation());
            old.transition(SessionState::Cancelled);
        }
        if old.close_radio() {
            self.radio.invalidate(None);
        }
    }

    fn dispatch(&mut self, envelope: Envelope) {
        let Envelope { generation, event } = envelope;
        let Some(session) = self.session.as_mut() else {
            debug!("{}: no session, discarding {}", generation, event.name());
            return;
        };
        if session.generation() != generation {
            debug!(
                "{}: stale, discarding {} (current {})",
                generation,
                event.name(),
                session.generation()
            );
            return;
        }

        if session.state().is_terminal() {
            match event {
                SessionEvent::Radio(RadioEvent::Invalidated(reason)) => {
                    debug!(
                        "{}: radio closed after {} ({})",
                        generation,
                        session.state(),
                        reason
                    );
                    session.close_radio();
                }
                other => debug!(
                    "{}: already {}, discarding {}",
                    generation,
                    session.state(),
                    other.name()
                ),
            }
            return;
        }

        match event {
            SessionEvent::Radio(RadioEvent::SessionActive) => self.on_session_active(),
            SessionEvent::Radio(RadioEvent::TagsDetected(tags)) => self.on_tags_detected(tags),
            SessionEvent::Radio(RadioEvent::Connected(result)) => self.on_connected(result),
            SessionEvent::Radio(RadioEvent::Invalidated(reason)) => self.on_invalidated(reason),
            SessionEvent::ExchangeFinished(result) => self.on_exchange_finished(result),
        }
    }

    fn on_session_active(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state() != &SessionState::Starting {
            warn!(
                "{}: session-active while {}",
                session.generation(),
                session.state()
            );
            return;
        }
        info!("{}: radio session active", session.generation());
        self.board.update(SCANNING_MESSAGE, ScanEvent::Scanning);
    }

    fn on_tags_detected(&mut self, tags: Vec<Tag>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state() != &SessionState::Starting {
            warn!(
                "{}: tags detected while {}",
                session.generation(),
                session.state()
            );
            return;
        }
        let count = tags.len();
        let Some(tag) = tags.into_iter().next() else {
            self.fail(SessionError::NoTag, NO_TAG_ALERT);
            return;
        };

        info!(
            "{}: detected {} tag(s), using {:?}",
            session.generation(),
            count,
            tag
        );
        session.transition(SessionState::TagDetected);
        session.set_tag(tag.clone());
        session.transition(SessionState::Connecting);
        let completion = EventSink::new(session.generation(), self.tx.clone()).connect_completion();
        self.board.update(CONNECTING_MESSAGE, ScanEvent::Connecting);
        self.radio.connect(&tag, completion);
    }

    fn on_connected(&mut self, result: std::result::Result<(), LinkError>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state() != &SessionState::Connecting {
            warn!(
                "{}: connect result while {}",
                session.generation(),
                session.state()
            );
            return;
        }
        if let Err(e) = result {
            self.fail(SessionError::ConnectionFailed(e.message().to_string()), CONNECTION_ALERT);
            return;
        }

        let Some(link) = session.tag().and_then(Tag::iso7816).cloned() else {
            self.fail(SessionError::IncompatibleCard, INCOMPATIBLE_ALERT);
            return;
        };

        let generation = session.generation();
        session.transition(SessionState::Exchanging);
        let transport = TagTransport::new(link, self.config.exchange_timeout());
        session.bind_exchange(transport.cancel_handle());

        let client = self.client.clone();
        let sink = EventSink::new(generation, self.tx.clone());
        let spawned = thread::Builder::new()
            .name(format!("tapcard-exchange-{}", generation.as_u64()))
            .spawn(move || {
                let mut transport = transport;
                let result = client.status(&mut transport);
                sink.exchange_finished(result);
            });

        match spawned {
            Ok(_) => self.board.update(EXCHANGING_MESSAGE, ScanEvent::Exchanging),
            Err(e) => self.fail(
                SessionError::Radio(format!("could not start exchange: {}", e)),
                CARD_ERROR_ALERT,
            ),
        }
    }

    fn on_exchange_finished(
        &mut self,
        result: std::result::Result<StatusResult, ProtocolError>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state() != &SessionState::Exchanging {
            warn!(
                "{}: exchange result while {}",
                session.generation(),
                session.state()
            );
            return;
        }

        match result {
            Ok(status) => {
                session.cancel_exchange();
                session.transition(SessionState::Succeeded);
                info!(
                    "{}: card status received (ver {}, pubkey {})",
                    session.generation(),
                    status.ver,
                    status.pubkey_hex()
                );
                let close = session.close_radio();
                self.board
                    .update(SUCCEEDED_MESSAGE, ScanEvent::Succeeded(status));
                if close {
                    self.radio.invalidate(None);
                }
            }
            Err(e) => self.fail(SessionError::Protocol(e.to_string()), CARD_ERROR_ALERT),
        }
    }

    fn on_invalidated(&mut self, reason: InvalidationReason) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.close_radio();
        match reason {
            InvalidationReason::UserCanceled => {
                session.cancel_exchange();
                session.transition(SessionState::Cancelled);
                info!("{}: scan cancelled", session.generation());
                self.board.update(CANCELLED_MESSAGE, ScanEvent::Cancelled);
            }
            InvalidationReason::SessionTerminatedUnexpectedly => {
                self.fail(SessionError::UnexpectedTermination, "");
            }
            other => self.fail(SessionError::Radio(other.to_string()), ""),
        }
    }

    /// Move the active session to `Failed`, publish, and invalidate the radio
    /// session with `alert` if it is still open.
    fn fail(&mut self, err: SessionError, alert: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.cancel_exchange();
        if !session.transition(SessionState::Failed(err.clone())) {
            return;
        }
        error!("{}: scan failed: {} ({:?})", session.generation(), err, err);
        let close = session.close_radio();
        let message = err.to_string();
        self.board.update(message.clone(), ScanEvent::Failed(message));
        if close {
            self.radio.invalidate(Some(alert));
        }
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.retire(session);
        }
    }
}

/// Helper to construct a [`ScanController`].
pub struct ControllerBuilder {
    radio: Option<Box<dyn RadioLink>>,
    client: Option<Arc<dyn CardProtocolClient>>,
    config: SessionConfig,
}

impl ControllerBuilder {
    /// Builder with the default config and no components.
    pub fn new() -> Self {
        Self {
            radio: None,
            client: None,
            config: SessionConfig::default(),
        }
    }

    /// Radio link to scan with.
    pub fn with_radio(mut self, radio: Box<dyn RadioLink>) -> Self {
        self.radio = Some(radio);
        self
    }

    /// Protocol client run against each connected card.
    pub fn with_client(mut self, client: Arc<dyn CardProtocolClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Override the default [`SessionConfig`].
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Requires a radio and a client; otherwise returns `MissingComponent`.
    pub fn build(self) -> Result<ScanController> {
        let radio = self.radio.ok_or(Error::MissingComponent("radio link"))?;
        let client = self.client.ok_or(Error::MissingComponent("protocol client"))?;
        Ok(ScanController::new(radio, client, self.config))
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
