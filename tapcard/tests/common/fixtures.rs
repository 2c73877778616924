// fixtures.rs: card status payloads as the applet returns them

use std::collections::BTreeMap;

use serde_cbor::Value;

pub type StatusMap = BTreeMap<Value, Value>;

fn key(name: &str) -> Value {
    Value::Text(name.to_string())
}

pub fn sample_pubkey() -> Vec<u8> {
    let mut pk = vec![0x02];
    pk.extend((1..=32).collect::<Vec<u8>>());
    pk
}

pub fn sample_card_nonce() -> Vec<u8> {
    vec![0x5a; 16]
}

/// Status map of a SATSCARD on slot 1 of 10.
pub fn satscard_status() -> StatusMap {
    let mut m = StatusMap::new();
    m.insert(key("proto"), Value::Integer(1));
    m.insert(key("ver"), Value::Text("1.0.3".into()));
    m.insert(key("birth"), Value::Integer(700_123));
    m.insert(
        key("slots"),
        Value::Array(vec![Value::Integer(1), Value::Integer(10)]),
    );
    m.insert(key("addr"), Value::Text("bc1q3x7...dd2ujx".into()));
    m.insert(key("pubkey"), Value::Bytes(sample_pubkey()));
    m.insert(key("card_nonce"), Value::Bytes(sample_card_nonce()));
    m
}

/// Status map of a TAPSIGNER with a derivation path and one backup.
pub fn tapsigner_status() -> StatusMap {
    let mut m = StatusMap::new();
    m.insert(key("proto"), Value::Integer(1));
    m.insert(key("ver"), Value::Text("1.0.1".into()));
    m.insert(key("birth"), Value::Integer(716_000));
    m.insert(key("tapsigner"), Value::Bool(true));
    m.insert(
        key("path"),
        Value::Array(vec![
            Value::Integer(0x8000_0054),
            Value::Integer(0x8000_0000),
            Value::Integer(0x8000_0000),
        ]),
    );
    m.insert(key("num_backups"), Value::Integer(1));
    m.insert(key("pubkey"), Value::Bytes(sample_pubkey()));
    m.insert(key("card_nonce"), Value::Bytes(sample_card_nonce()));
    m
}

pub fn card_error(code: i128, message: &str) -> StatusMap {
    let mut m = StatusMap::new();
    m.insert(key("error"), Value::Text(message.into()));
    m.insert(key("code"), Value::Integer(code));
    m
}

pub fn encode(map: StatusMap) -> Vec<u8> {
    serde_cbor::to_vec(&Value::Map(map)).unwrap()
}
