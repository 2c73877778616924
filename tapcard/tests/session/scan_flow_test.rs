#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tapcard::radio::mock::MockReply;
use tapcard::radio::{InvalidationReason, LinkError, MockRadio, MockTag, Tag, WireReply};
use tapcard::session::ScanController;
use tapcard::test_support::radio_with_tag;
use tapcard::transport::ApduTransport;
use tapcard::{
    CardProtocolClient, Command, ProtocolError, ScanEvent, SessionConfig, SessionError,
    SessionState, StatusResult,
};

const WAIT: Duration = Duration::from_secs(5);

/// Client that sends one APDU and counts how often it was invoked.
fn counting_client(calls: Arc<AtomicUsize>) -> Arc<dyn CardProtocolClient> {
    Arc::new(
        move |t: &mut dyn ApduTransport| -> Result<StatusResult, ProtocolError> {
            calls.fetch_add(1, Ordering::SeqCst);
            let r = t.exchange(&Command::from_bytes(vec![0x00, 0xA4, 0x04, 0x00]))?;
            if !r.is_success() {
                return Err(ProtocolError::Status(r.status_word()));
            }
            Ok(StatusResult {
                proto: 1,
                ver: "1.0.3".into(),
                pubkey: r.payload().to_vec(),
                ..Default::default()
            })
        },
    )
}

fn controller(radio: &MockRadio, timeout_ms: u64) -> (ScanController, Arc<AtomicUsize>) {
    common::init_logger();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = ScanController::builder()
        .with_radio(Box::new(radio.clone()))
        .with_client(counting_client(calls.clone()))
        .with_config(
            SessionConfig::builder()
                .exchange_timeout_ms(timeout_ms)
                .alert_message("Hold your card near the top of the phone.")
                .build(),
        )
        .build()
        .unwrap();
    (c, calls)
}

fn failed(err: SessionError) -> Option<SessionState> {
    Some(SessionState::Failed(err))
}

#[test]
fn success_survives_later_termination_report() {
    let (radio, _tag) = radio_with_tag(vec![WireReply::ok(vec![0x03, 0x01])]);
    radio.set_echo_invalidation(Some(InvalidationReason::SessionTerminatedUnexpectedly));
    let (mut c, calls) = controller(&radio, 2_000);
    let events = c.subscribe();

    c.begin_scan();
    assert_eq!(c.process_until_terminal(WAIT), Some(SessionState::Succeeded));
    // the radio reports its own teardown after our invalidate
    assert_eq!(c.pump(), 1);

    assert_eq!(c.state(), Some(&SessionState::Succeeded));
    assert_eq!(c.status_message(), "Card status received.");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let published: Vec<ScanEvent> = events.try_iter().collect();
    assert!(matches!(published.last(), Some(ScanEvent::Succeeded(s)) if s.pubkey == vec![0x03, 0x01]));
    assert!(!published.iter().any(|e| matches!(e, ScanEvent::Failed(_))));
    assert_eq!(radio.log().alert_messages, vec!["Hold your card near the top of the phone."]);
}

#[test]
fn zero_tags_fails_without_connecting() {
    let radio = MockRadio::new();
    radio.discover(vec![]);
    let (mut c, calls) = controller(&radio, 2_000);

    c.begin_scan();
    assert_eq!(c.process_until_terminal(WAIT), failed(SessionError::NoTag));
    assert!(radio.log().connects.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        radio.log().invalidations,
        vec![Some("Could not detect tag.".to_string())]
    );
    assert_eq!(c.status_message(), "no tag detected");
}

#[test]
fn incompatible_tag_never_reaches_protocol_client() {
    let radio = MockRadio::new();
    radio.discover(vec![Tag::FeliCa {
        idm: vec![0x01, 0x2e, 0x4c, 0xd3, 0x5a, 0x10, 0x77, 0x08],
    }]);
    let (mut c, calls) = controller(&radio, 2_000);

    c.begin_scan();
    assert_eq!(
        c.process_until_terminal(WAIT),
        failed(SessionError::IncompatibleCard)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(radio.log().connects, vec!["felica(012e4cd35a107708)"]);
    assert_eq!(
        radio.log().invalidations,
        vec![Some("Card not compatible.".to_string())]
    );
}

#[test]
fn first_of_several_tags_is_used() {
    let radio = MockRadio::new();
    let first = Arc::new(MockTag::with_identifier(vec![0x04, 0x01]));
    let second = Arc::new(MockTag::with_identifier(vec![0x04, 0x02]));
    first.push_reply(WireReply::ok(vec![0x01]));
    radio.discover(vec![Tag::Iso7816(first.clone()), Tag::Iso7816(second.clone())]);
    let (mut c, _) = controller(&radio, 2_000);

    c.begin_scan();
    assert_eq!(c.process_until_terminal(WAIT), Some(SessionState::Succeeded));
    assert_eq!(first.sent().len(), 1);
    assert!(second.sent().is_empty());
    assert_eq!(radio.log().connects, vec!["iso7816(0401)"]);
}

#[test]
fn connection_failure_is_reported() {
    let (radio, tag) = radio_with_tag(vec![]);
    radio.push_connect_result(Err(LinkError::new("tag moved out of range")));
    let (mut c, calls) = controller(&radio, 2_000);
    let events = c.subscribe();

    c.begin_scan();
    assert_eq!(
        c.process_until_terminal(WAIT),
        failed(SessionError::ConnectionFailed("tag moved out of range".into()))
    );
    assert!(tag.sent().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        radio.log().invalidations,
        vec![Some("Connection failed.".to_string())]
    );
    assert_eq!(
        events.try_iter().last(),
        Some(ScanEvent::Failed("connection failed".into()))
    );
}

#[test]
fn non_ok_status_surfaces_as_protocol_error() {
    let (radio, _tag) = radio_with_tag(vec![WireReply::new(vec![], 0x6A, 0x82)]);
    let (mut c, _) = controller(&radio, 2_000);

    c.begin_scan();
    assert_eq!(
        c.process_until_terminal(WAIT),
        failed(SessionError::Protocol("card returned status 6a82".into()))
    );
    assert_eq!(c.status_message(), "protocol error: card returned status 6a82");
    assert_eq!(
        radio.log().invalidations,
        vec![Some("Card error.".to_string())]
    );
}

#[test]
fn exchange_timeout_fails_session() {
    let (radio, tag) = radio_with_tag(vec![]);
    tag.push(MockReply::Silent);
    let (mut c, _) = controller(&radio, 100);

    c.begin_scan();
    match c.process_until_terminal(WAIT) {
        Some(SessionState::Failed(SessionError::Protocol(msg))) => {
            assert!(msg.contains("timed out"), "{}", msg)
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn user_cancel_from_radio_ends_scan() {
    let radio = MockRadio::new();
    let (mut c, _) = controller(&radio, 2_000);
    let events = c.subscribe();

    c.begin_scan();
    radio
        .sink()
        .unwrap()
        .invalidated(InvalidationReason::UserCanceled);
    assert_eq!(c.process_until_terminal(WAIT), Some(SessionState::Cancelled));
    assert_eq!(c.status_message(), "Scan cancelled.");
    assert_eq!(events.try_iter().last(), Some(ScanEvent::Cancelled));
    // the radio already closed the session; nothing to invalidate
    assert!(radio.log().invalidations.is_empty());
}

#[test]
fn unexpected_termination_while_polling_fails() {
    let radio = MockRadio::new();
    let (mut c, _) = controller(&radio, 2_000);

    c.begin_scan();
    radio
        .sink()
        .unwrap()
        .invalidated(InvalidationReason::SessionTerminatedUnexpectedly);
    assert_eq!(
        c.process_until_terminal(WAIT),
        failed(SessionError::UnexpectedTermination)
    );
    assert!(radio.log().invalidations.is_empty());
}

#[test]
fn radio_timeout_is_a_radio_error() {
    let radio = MockRadio::new();
    let (mut c, _) = controller(&radio, 2_000);

    c.begin_scan();
    radio
        .sink()
        .unwrap()
        .invalidated(InvalidationReason::SessionTimeout);
    assert_eq!(
        c.process_until_terminal(WAIT),
        failed(SessionError::Radio("session timeout".into()))
    );
}
