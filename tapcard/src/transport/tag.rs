// tapcard/src/transport/tag.rs

//! Blocking APDU transport over an asynchronous tag link.
//!
//! Each exchange arms a one-shot slot with a fresh sequence number, hands a
//! completion to the tag link and waits on the slot. The slot is signalled
//! once, by whichever comes first: the link's completion, the completion
//! being dropped, or [`CancelHandle::cancel`]. The timeout is applied by the
//! waiting side. Late signals carry a stale sequence number and are dropped.

use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};

use crate::error::TransportError;
use crate::protocol::{Command, Response};
use crate::radio::{LinkError, TagLink, WireReply};
use crate::transport::traits::ApduTransport;
use crate::utils::lock;

type Outcome = Result<Response, TransportError>;

#[derive(Default)]
struct Slot {
    closed: bool,
    seq: u64,
    waiter: Option<(u64, SyncSender<Outcome>)>,
}

/// Deliver `outcome` to the waiter armed for `seq`. Returns false if the
/// slot was already signalled or re-armed for a later exchange.
fn signal(slot: &Mutex<Slot>, seq: u64, outcome: Outcome) -> bool {
    let mut slot = lock(slot);
    match slot.waiter.take() {
        Some((armed, tx)) if armed == seq => {
            let _ = tx.try_send(outcome);
            true
        }
        other => {
            slot.waiter = other;
            false
        }
    }
}

/// Completion side of one exchange. Dropping it unfired counts as the
/// session going away.
struct PendingReply {
    slot: Arc<Mutex<Slot>>,
    seq: u64,
}

impl PendingReply {
    fn complete(&self, reply: Result<WireReply, LinkError>) {
        if !signal(&self.slot, self.seq, classify(reply)) {
            debug!("discarding late reply for exchange {}", self.seq);
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        signal(&self.slot, self.seq, Err(TransportError::Cancelled));
    }
}

/// Normalize a link callback into an exchange outcome.
pub(crate) fn classify(reply: Result<WireReply, LinkError>) -> Outcome {
    match reply {
        Ok(WireReply { payload, sw1, sw2 }) => Ok(Response::from_parts(&payload, sw1, sw2)),
        Err(e) => Err(TransportError::Transport(format!("NFC error: {}", e))),
    }
}

/// Log an exchange outcome the way every transport in this crate does.
pub(crate) fn log_outcome(outcome: &Outcome) {
    match outcome {
        Ok(resp) => {
            debug!("APDU << {}", resp.to_hex());
            if !resp.is_success() {
                warn!(
                    "card returned non-OK status word {}, passing it through",
                    resp.status_word()
                );
            }
        }
        Err(e) => warn!("APDU exchange failed: {}", e),
    }
}

/// Cancels a [`TagTransport`] from another thread. After `cancel`, an
/// in-flight exchange returns [`TransportError::Cancelled`] and every later
/// exchange fails immediately with the same error.
#[derive(Clone)]
pub struct CancelHandle {
    slot: Arc<Mutex<Slot>>,
}

impl CancelHandle {
    /// Close the transport and wake a waiting exchange.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        slot.closed = true;
        if let Some((_, tx)) = slot.waiter.take() {
            let _ = tx.try_send(Err(TransportError::Cancelled));
        }
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        lock(&self.slot).closed
    }
}

/// [`ApduTransport`] bound to one connected ISO 7816 tag.
pub struct TagTransport {
    link: Arc<dyn TagLink>,
    timeout: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl TagTransport {
    /// Bind to `link`; each exchange waits at most `timeout` for its reply.
    pub fn new(link: Arc<dyn TagLink>, timeout: Duration) -> Self {
        debug!(
            "transport bound to tag {}",
            crate::utils::encode_hex(&link.identifier())
        );
        Self {
            link,
            timeout,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Handle that cancels this transport from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            slot: self.slot.clone(),
        }
    }

    fn arm(&self) -> Result<(u64, mpsc::Receiver<Outcome>), TransportError> {
        let mut slot = lock(&self.slot);
        if slot.closed {
            return Err(TransportError::Cancelled);
        }
        slot.seq += 1;
        let (tx, rx) = mpsc::sync_channel(1);
        slot.waiter = Some((slot.seq, tx));
        Ok((slot.seq, rx))
    }
}

impl ApduTransport for TagTransport {
    fn exchange(&mut self, command: &Command) -> Result<Response, TransportError> {
        let (seq, rx) = self.arm()?;

        debug!("APDU >> {}", command.to_hex());
        let pending = PendingReply {
            slot: self.slot.clone(),
            seq,
        };
        self.link.send_command(
            command.as_bytes(),
            Box::new(move |reply| pending.complete(reply)),
        );

        let outcome = match rx.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(TransportError::timed_out()),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Cancelled),
        };

        // Disarm so a reply that lost the race finds nothing to signal.
        let mut slot = lock(&self.slot);
        if matches!(slot.waiter, Some((armed, _)) if armed == seq) {
            slot.waiter = None;
        }
        drop(slot);

        log_outcome(&outcome);
        outcome
    }
}
