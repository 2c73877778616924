// tapcard/src/transport/nonblocking.rs

//! Exchange contract for callers running on a tokio runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::{Notify, oneshot};

use crate::error::TransportError;
use crate::protocol::{Command, Response};
use crate::radio::TagLink;
use crate::transport::tag::{classify, log_outcome};

/// Async form of [`ApduTransport`](crate::transport::ApduTransport).
#[async_trait]
pub trait AsyncApduTransport: Send {
    /// Send `command` and await its response.
    async fn exchange(&mut self, command: &Command) -> Result<Response, TransportError>;
}

#[derive(Default)]
struct Closer {
    closed: AtomicBool,
    notify: Notify,
}

/// Cancels an [`AsyncTagTransport`].
#[derive(Clone)]
pub struct AsyncCancelHandle {
    closer: Arc<Closer>,
}

impl AsyncCancelHandle {
    /// Fail the in-flight exchange and every later one with `Cancelled`.
    pub fn cancel(&self) {
        self.closer.closed.store(true, Ordering::SeqCst);
        // notify_one stores a permit when nobody is waiting yet
        self.closer.notify.notify_one();
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.closer.closed.load(Ordering::SeqCst)
    }
}

/// Async counterpart of [`TagTransport`](crate::transport::TagTransport).
pub struct AsyncTagTransport {
    link: Arc<dyn TagLink>,
    timeout: Duration,
    closer: Arc<Closer>,
}

impl AsyncTagTransport {
    /// Bind to `link`; each exchange waits at most `timeout`.
    pub fn new(link: Arc<dyn TagLink>, timeout: Duration) -> Self {
        Self {
            link,
            timeout,
            closer: Arc::new(Closer::default()),
        }
    }

    /// Handle that cancels this transport from another task.
    pub fn cancel_handle(&self) -> AsyncCancelHandle {
        AsyncCancelHandle {
            closer: self.closer.clone(),
        }
    }
}

#[async_trait]
impl AsyncApduTransport for AsyncTagTransport {
    async fn exchange(&mut self, command: &Command) -> Result<Response, TransportError> {
        if self.closer.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Cancelled);
        }

        let (tx, rx) = oneshot::channel();
        debug!("APDU >> {}", command.to_hex());
        self.link.send_command(
            command.as_bytes(),
            Box::new(move |reply| {
                let _ = tx.send(classify(reply));
            }),
        );

        let outcome = tokio::select! {
            waited = tokio::time::timeout(self.timeout, rx) => match waited {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(TransportError::Cancelled),
                Err(_) => Err(TransportError::timed_out()),
            },
            _ = self.closer.notify.notified() => Err(TransportError::Cancelled),
        };

        log_outcome(&outcome);
        outcome
    }
}
