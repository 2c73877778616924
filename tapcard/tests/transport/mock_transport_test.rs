#[path = "../common/mod.rs"]
mod common;

use tapcard::test_support::{boxed_mock_with_responses, wire_reply};
use tapcard::transport::MockTransport;
use tapcard::transport::ApduTransport;
use tapcard::{Command, StatusWord, TransportError};

#[test]
fn mock_transport_records_and_replies() {
    let mut m = MockTransport::new();
    m.push_reply(&[0xCA, 0xFE], 0x90, 0x00);
    let r = m.exchange(&Command::select(&[0xF0, 0x01]).unwrap()).unwrap();
    assert_eq!(r.payload(), &[0xCA, 0xFE]);
    assert_eq!(m.sent.len(), 1);
    assert_eq!(m.sent[0].to_hex(), "00a4040002f001");
}

#[test]
fn short_raw_response_is_transport_error() {
    let mut m = MockTransport::new();
    m.push_response(vec![0x90]);
    assert!(matches!(
        m.exchange(&Command::from_bytes(vec![0x00])),
        Err(TransportError::Transport(_))
    ));
}

#[test]
fn boxed_mock_replays_in_order() {
    let mut t = boxed_mock_with_responses(vec![vec![0x01, 0x90, 0x00], vec![0x6D, 0x00]]);
    let cmd = Command::from_bytes(vec![0x00]);
    assert!(t.exchange(&cmd).unwrap().is_success());
    assert_eq!(t.exchange(&cmd).unwrap().status_word(), StatusWord::new(0x6d00));
    assert!(t.exchange(&cmd).unwrap_err().is_timeout());
}

#[test]
fn wire_reply_splits_status_word() {
    let r = wire_reply(&[0x01, 0x02, 0x6A, 0x82]).unwrap();
    assert_eq!(r.payload, vec![0x01, 0x02]);
    assert_eq!((r.sw1, r.sw2), (0x6A, 0x82));
    assert!(wire_reply(&[0x90]).is_none());
}
