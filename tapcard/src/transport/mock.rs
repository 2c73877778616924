// tapcard/src/transport/mock.rs

use std::collections::VecDeque;

use crate::error::TransportError;
use crate::protocol::{Command, Response};
use crate::transport::traits::ApduTransport;

/// Mock transport for protocol-client tests. It records sent commands and
/// returns queued responses; an empty queue yields a timeout error.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Commands in the order they were sent.
    pub sent: Vec<Command>,
    /// Outcomes returned by the next exchanges, front first.
    pub responses: VecDeque<Result<Response, TransportError>>,
}

impl MockTransport {
    /// Transport with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response (payload followed by status word). Fewer than two
    /// bytes queue a transport error instead.
    pub fn push_response(&mut self, bytes: Vec<u8>) {
        let resp = Response::from_bytes(bytes).ok_or_else(|| {
            TransportError::Transport("response shorter than a status word".to_string())
        });
        self.responses.push_back(resp);
    }

    /// Queue a reply built from payload and status word.
    pub fn push_reply(&mut self, payload: &[u8], sw1: u8, sw2: u8) {
        self.responses
            .push_back(Ok(Response::from_parts(payload, sw1, sw2)));
    }

    /// Queue a transport error.
    pub fn push_error(&mut self, err: TransportError) {
        self.responses.push_back(Err(err));
    }

    /// Remove and return the most recently sent command.
    pub fn pop_sent(&mut self) -> Option<Command> {
        self.sent.pop()
    }
}

impl ApduTransport for MockTransport {
    fn exchange(&mut self, command: &Command) -> Result<Response, TransportError> {
        self.sent.push(command.clone());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::timed_out()))
    }
}
