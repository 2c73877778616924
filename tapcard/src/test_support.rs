//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common mock setup so tests across the crate and
//! the tests/ directory script radios and tags the same way.
#![allow(dead_code)]

use std::sync::Arc;

use crate::protocol::Response;
use crate::radio::{MockRadio, MockTag, Tag, WireReply};
use crate::transport::{ApduTransport, MockTransport};

/// Build a MockTransport pre-seeded with the given raw responses (payload
/// followed by status word) and return it boxed as a trait object.
#[doc(hidden)]
pub fn boxed_mock_with_responses(responses: Vec<Vec<u8>>) -> Box<dyn ApduTransport> {
    let mut mock = MockTransport::new();
    for resp in responses {
        mock.push_response(resp);
    }
    Box::new(mock)
}

/// A MockTag that answers each command with the next of `replies`.
#[doc(hidden)]
pub fn tag_with_replies(replies: Vec<WireReply>) -> Arc<MockTag> {
    let tag = Arc::new(MockTag::new());
    for reply in replies {
        tag.push_reply(reply);
    }
    tag
}

/// A MockRadio whose next scan discovers `tag` as its only ISO 7816 tag.
/// Returns the radio together with the tag so the test can inspect both.
#[doc(hidden)]
pub fn radio_with_tag(replies: Vec<WireReply>) -> (MockRadio, Arc<MockTag>) {
    let radio = MockRadio::new();
    let tag = tag_with_replies(replies);
    radio.discover(vec![Tag::Iso7816(tag.clone())]);
    (radio, tag)
}

/// Split a raw response into the reply a radio link would deliver.
#[doc(hidden)]
pub fn wire_reply(raw: &[u8]) -> Option<WireReply> {
    let resp = Response::from_bytes(raw.to_vec())?;
    let sw = resp.status_word();
    Some(WireReply::new(resp.payload(), sw.sw1(), sw.sw2()))
}
