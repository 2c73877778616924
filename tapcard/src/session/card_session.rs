// tapcard/src/session/card_session.rs

use log::{debug, warn};

use crate::radio::Tag;
use crate::session::state::{Generation, SessionState};
use crate::transport::CancelHandle;

/// State of one scan: its generation, lifecycle state, the discovered tag
/// and the cancel handle of the transport bound to it.
///
/// A new scan always gets a new `CardSession`.
pub struct CardSession {
    generation: Generation,
    state: SessionState,
    tag: Option<Tag>,
    exchange: Option<CancelHandle>,
    radio_live: bool,
}

impl CardSession {
    /// Fresh session in `Idle`.
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            state: SessionState::Idle,
            tag: None,
            exchange: None,
            radio_live: false,
        }
    }

    /// Generation this session belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Tag chosen for this session, once detected.
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    /// Apply `next` if it is a legal step from the current state. Illegal
    /// steps are logged and ignored.
    pub fn transition(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(&next) {
            warn!(
                "{}: ignoring illegal transition {} -> {}",
                self.generation, self.state, next
            );
            return false;
        }
        debug!("{}: {} -> {}", self.generation, self.state, next);
        self.state = next;
        true
    }

    pub(crate) fn set_tag(&mut self, tag: Tag) {
        self.tag = Some(tag);
    }

    pub(crate) fn bind_exchange(&mut self, handle: CancelHandle) {
        self.exchange = Some(handle);
    }

    /// Cancel the bound transport, if any. Later exchanges on it fail with
    /// `Cancelled`.
    pub(crate) fn cancel_exchange(&mut self) {
        if let Some(handle) = self.exchange.take() {
            handle.cancel();
        }
    }

    pub(crate) fn mark_radio_live(&mut self) {
        self.radio_live = true;
    }

    /// Whether the radio session is open.
    pub fn radio_live(&self) -> bool {
        self.radio_live
    }

    /// Mark the radio session closed. Returns whether it was still open,
    /// i.e. whether the caller should invalidate it.
    pub(crate) fn close_radio(&mut self) -> bool {
        std::mem::replace(&mut self.radio_live, false)
    }
}
