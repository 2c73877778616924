#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures;
use tapcard::cktap::{APPLET_AID, StatusClient};
use tapcard::radio::WireReply;
use tapcard::session::ScanController;
use tapcard::test_support::radio_with_tag;
use tapcard::transport::TagTransport;
use tapcard::{
    CardKind, CardProtocolClient, Command, ProtocolError, ScanEvent,
    SessionConfig, SessionError, SessionState,
};

const WAIT: Duration = Duration::from_secs(5);

fn scan(reply: WireReply) -> (ScanController, Vec<Vec<u8>>, Vec<ScanEvent>) {
    common::init_logger();
    let (radio, tag) = radio_with_tag(vec![reply]);
    let mut c = ScanController::new(
        Box::new(radio),
        Arc::new(StatusClient::new()),
        SessionConfig::default(),
    );
    let events = c.subscribe();
    c.begin_scan();
    c.process_until_terminal(WAIT);
    c.pump();
    let published = events.try_iter().collect();
    (c, tag.sent(), published)
}

#[test]
fn satscard_status_end_to_end() {
    let (c, sent, events) = scan(WireReply::ok(fixtures::encode(fixtures::satscard_status())));

    assert_eq!(c.state(), Some(&SessionState::Succeeded));
    assert_eq!(sent, vec![Command::select(&APPLET_AID).unwrap().into_bytes()]);
    assert_eq!(
        hex::encode(&sent[0]),
        "00a404000ff0436f696e6b697465434152447631"
    );

    let status = c.last_status().unwrap();
    assert_eq!(status.kind(), CardKind::SatsCard);
    assert_eq!(status.active_slot(), Some(1));
    assert_eq!(status.slots, Some((1, 10)));
    assert_eq!(status.pubkey, fixtures::sample_pubkey());
    assert_eq!(status.card_nonce_hex(), hex::encode(fixtures::sample_card_nonce()));
    assert!(matches!(events.last(), Some(ScanEvent::Succeeded(s)) if s == status));
}

#[test]
fn tapsigner_status_end_to_end() -> anyhow::Result<()> {
    let (c, _, _) = scan(WireReply::ok(fixtures::encode(fixtures::tapsigner_status())));
    let status = c
        .last_status()
        .ok_or_else(|| anyhow::anyhow!("scan ended without a status"))?;
    assert_eq!(status.kind(), CardKind::TapSigner);
    assert_eq!(status.num_backups, Some(1));
    assert_eq!(
        status.path,
        Some(vec![0x8000_0054, 0x8000_0000, 0x8000_0000])
    );
    assert_eq!(status.slots, None);
    Ok(())
}

#[test]
fn applet_not_found_fails_scan() {
    let (c, _, events) = scan(WireReply::new(vec![], 0x6A, 0x82));
    assert_eq!(
        c.state(),
        Some(&SessionState::Failed(SessionError::Protocol(
            "card returned status 6a82".into()
        )))
    );
    assert_eq!(
        events.last(),
        Some(&ScanEvent::Failed(
            "protocol error: card returned status 6a82".into()
        ))
    );
}

#[test]
fn card_error_map_is_reported() {
    let (c, _, _) = scan(WireReply::ok(fixtures::encode(fixtures::card_error(
        429,
        "rate limited",
    ))));
    match c.state() {
        Some(SessionState::Failed(SessionError::Protocol(msg))) => {
            assert!(msg.contains("rate limited"), "{}", msg)
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn garbage_payload_is_decode_error() {
    common::init_logger();
    let (_radio, tag) = radio_with_tag(vec![WireReply::ok(vec![0xff, 0x00, 0x13])]);
    let mut t = TagTransport::new(tag, Duration::from_secs(5));
    let err = StatusClient::new().status(&mut t).unwrap_err();
    assert!(matches!(err, ProtocolError::Decode(_)), "{:?}", err);
}
