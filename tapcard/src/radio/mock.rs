// tapcard/src/radio/mock.rs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::SessionConfig;
use crate::radio::traits::{
    ConnectCompletion, InvalidationReason, LinkError, PollingTarget, RadioLink, ReplyCompletion,
    Tag, TagLink, WireReply,
};
use crate::session::EventSink;
use crate::utils::lock;

/// Scripted behaviour for one `send_command` call on a [`MockTag`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Deliver this reply from a separate thread.
    Reply(WireReply),
    /// Deliver a link error from a separate thread.
    Fail(String),
    /// Keep the completion and never call it.
    Silent,
    /// Drop the completion without calling it.
    Drop,
}

#[derive(Default)]
struct MockTagState {
    sent: Vec<Vec<u8>>,
    replies: VecDeque<MockReply>,
    held: VecDeque<ReplyCompletion>,
}

/// Simulated ISO 7816 tag. Records sent APDUs and answers from a queue of
/// scripted replies; an empty queue behaves like [`MockReply::Silent`].
pub struct MockTag {
    identifier: Vec<u8>,
    state: Mutex<MockTagState>,
}

impl MockTag {
    /// Tag with a fixed seven-byte UID.
    pub fn new() -> Self {
        Self::with_identifier(vec![0x04, 0x5c, 0x11, 0x2a, 0x9e, 0x60, 0x80])
    }

    /// Tag with the given UID.
    pub fn with_identifier(identifier: Vec<u8>) -> Self {
        Self {
            identifier,
            state: Mutex::new(MockTagState::default()),
        }
    }

    /// Queue a reply for the next command.
    pub fn push_reply(&self, reply: WireReply) {
        lock(&self.state).replies.push_back(MockReply::Reply(reply));
    }

    /// Queue a link error for the next command.
    pub fn push_failure(&self, message: &str) {
        lock(&self.state)
            .replies
            .push_back(MockReply::Fail(message.to_string()));
    }

    /// Queue any scripted behaviour for the next command.
    pub fn push(&self, reply: MockReply) {
        lock(&self.state).replies.push_back(reply);
    }

    /// APDUs sent so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.state).sent.clone()
    }

    /// Number of completions kept by [`MockReply::Silent`] and not yet released.
    pub fn held(&self) -> usize {
        lock(&self.state).held.len()
    }

    /// Fire the oldest held completion with `reply`, simulating a late
    /// callback. Returns false if nothing was held.
    pub fn release_held(&self, reply: WireReply) -> bool {
        let completion = lock(&self.state).held.pop_front();
        match completion {
            Some(completion) => {
                completion(Ok(reply));
                true
            }
            None => false,
        }
    }
}

impl Default for MockTag {
    fn default() -> Self {
        Self::new()
    }
}

impl TagLink for MockTag {
    fn identifier(&self) -> Vec<u8> {
        self.identifier.clone()
    }

    fn send_command(&self, apdu: &[u8], completion: ReplyCompletion) {
        let next = {
            let mut state = lock(&self.state);
            state.sent.push(apdu.to_vec());
            state.replies.pop_front().unwrap_or(MockReply::Silent)
        };

        match next {
            MockReply::Reply(reply) => {
                thread::spawn(move || completion(Ok(reply)));
            }
            MockReply::Fail(message) => {
                thread::spawn(move || completion(Err(LinkError::new(message))));
            }
            MockReply::Silent => lock(&self.state).held.push_back(completion),
            MockReply::Drop => drop(completion),
        }
    }
}

/// Calls recorded by a [`MockRadio`].
#[derive(Debug, Default, Clone)]
pub struct RadioLog {
    /// Number of `begin` calls.
    pub begins: usize,
    /// Alert message passed to each `begin`.
    pub alert_messages: Vec<String>,
    /// Polling targets passed to each `begin`.
    pub polling: Vec<Vec<PollingTarget>>,
    /// Debug form of each tag passed to `connect`.
    pub connects: Vec<String>,
    /// Error message passed to each `invalidate`.
    pub invalidations: Vec<Option<String>>,
}

struct MockRadioState {
    log: RadioLog,
    sink: Option<EventSink>,
    discovery: VecDeque<Vec<Tag>>,
    connect_results: VecDeque<Result<(), LinkError>>,
    echo_invalidation: Option<InvalidationReason>,
    begin_error: Option<LinkError>,
}

/// Simulated radio link for tests and demos.
///
/// Clones share state, so a test can keep one handle while the controller
/// owns another. Each `begin` pops one scripted discovery (if any) and
/// reports session activation followed by the discovered tags. `invalidate`
/// echoes an invalidation event the way a real radio does, by default
/// [`InvalidationReason::UserCanceled`].
#[derive(Clone)]
pub struct MockRadio {
    state: Arc<Mutex<MockRadioState>>,
}

impl MockRadio {
    /// Radio with nothing scripted; invalidations echo `UserCanceled`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockRadioState {
                log: RadioLog::default(),
                sink: None,
                discovery: VecDeque::new(),
                connect_results: VecDeque::new(),
                echo_invalidation: Some(InvalidationReason::UserCanceled),
                begin_error: None,
            })),
        }
    }

    /// Report `tags` on the next `begin`.
    pub fn discover(&self, tags: Vec<Tag>) {
        lock(&self.state).discovery.push_back(tags);
    }

    /// Result for the next `connect`; unscripted connects succeed.
    pub fn push_connect_result(&self, result: Result<(), LinkError>) {
        lock(&self.state).connect_results.push_back(result);
    }

    /// Reason echoed after each `invalidate`; `None` disables the echo.
    pub fn set_echo_invalidation(&self, reason: Option<InvalidationReason>) {
        lock(&self.state).echo_invalidation = reason;
    }

    /// Make the next `begin` fail with `error`.
    pub fn fail_next_begin(&self, error: LinkError) {
        lock(&self.state).begin_error = Some(error);
    }

    /// Sink of the most recently begun session.
    pub fn sink(&self) -> Option<EventSink> {
        lock(&self.state).sink.clone()
    }

    /// Snapshot of the calls recorded so far.
    pub fn log(&self) -> RadioLog {
        lock(&self.state).log.clone()
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioLink for MockRadio {
    fn begin(&mut self, config: &SessionConfig, sink: EventSink) -> Result<(), LinkError> {
        let discovered = {
            let mut state = lock(&self.state);
            state.log.begins += 1;
            state.log.alert_messages.push(config.alert_message.clone());
            state.log.polling.push(config.polling.clone());
            if let Some(err) = state.begin_error.take() {
                return Err(err);
            }
            state.sink = Some(sink.clone());
            state.discovery.pop_front()
        };

        if let Some(tags) = discovered {
            sink.session_active();
            sink.tags_detected(tags);
        }
        Ok(())
    }

    fn connect(&mut self, tag: &Tag, completion: ConnectCompletion) {
        let result = {
            let mut state = lock(&self.state);
            state.log.connects.push(format!("{:?}", tag));
            state.connect_results.pop_front().unwrap_or(Ok(()))
        };
        completion(result);
    }

    fn invalidate(&mut self, error_message: Option<&str>) {
        let echo = {
            let mut state = lock(&self.state);
            state
                .log
                .invalidations
                .push(error_message.map(str::to_string));
            match (&state.echo_invalidation, &state.sink) {
                (Some(reason), Some(sink)) => Some((reason.clone(), sink.clone())),
                _ => None,
            }
        };
        if let Some((reason, sink)) = echo {
            sink.invalidated(reason);
        }
    }
}
