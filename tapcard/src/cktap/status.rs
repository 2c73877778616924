// tapcard/src/cktap/status.rs

use std::collections::BTreeMap;

use serde_cbor::Value;

use crate::client::StatusResult;
use crate::error::ProtocolError;

type Map = BTreeMap<Value, Value>;

fn decode_err(msg: impl Into<String>) -> ProtocolError {
    ProtocolError::Decode(msg.into())
}

fn field<'a>(map: &'a Map, key: &str) -> Option<&'a Value> {
    map.get(&Value::Text(key.to_string()))
}

fn uint(map: &Map, key: &str) -> Result<Option<u64>, ProtocolError> {
    match field(map, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Integer(i)) => u64::try_from(*i)
            .map(Some)
            .map_err(|_| decode_err(format!("{} out of range: {}", key, i))),
        Some(other) => Err(decode_err(format!("{} is not an integer: {:?}", key, other))),
    }
}

fn text(map: &Map, key: &str) -> Result<Option<String>, ProtocolError> {
    match field(map, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Text(s)) => Ok(Some(s.clone())),
        Some(other) => Err(decode_err(format!("{} is not text: {:?}", key, other))),
    }
}

fn bytes(map: &Map, key: &str) -> Result<Option<Vec<u8>>, ProtocolError> {
    match field(map, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bytes(b)) => Ok(Some(b.clone())),
        Some(other) => Err(decode_err(format!("{} is not bytes: {:?}", key, other))),
    }
}

fn flag(map: &Map, key: &str) -> Result<bool, ProtocolError> {
    match field(map, key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(decode_err(format!("{} is not a bool: {:?}", key, other))),
    }
}

fn uint_list(map: &Map, key: &str) -> Result<Option<Vec<u64>>, ProtocolError> {
    match field(map, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::Integer(i) => u64::try_from(*i)
                    .map_err(|_| decode_err(format!("{} element out of range: {}", key, i))),
                other => Err(decode_err(format!("{} element is not an integer: {:?}", key, other))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(decode_err(format!("{} is not an array: {:?}", key, other))),
    }
}

fn required<T>(value: Option<T>, key: &str) -> Result<T, ProtocolError> {
    value.ok_or_else(|| decode_err(format!("missing field {}", key)))
}

/// Decode the CBOR status map a card returns on applet select.
///
/// A map carrying `error` is reported as [`ProtocolError::Card`].
pub fn decode_status(payload: &[u8]) -> Result<StatusResult, ProtocolError> {
    let value: Value =
        serde_cbor::from_slice(payload).map_err(|e| decode_err(format!("invalid CBOR: {}", e)))?;
    let map = match value {
        Value::Map(map) => map,
        other => return Err(decode_err(format!("expected a map, got {:?}", other))),
    };

    if let Some(message) = text(&map, "error")? {
        let code = uint(&map, "code")?.unwrap_or(0);
        return Err(ProtocolError::Card {
            code: u16::try_from(code).unwrap_or(u16::MAX),
            message,
        });
    }

    let slots = match uint_list(&map, "slots")? {
        None => None,
        Some(s) if s.len() == 2 => Some((s[0], s[1])),
        Some(s) => return Err(decode_err(format!("slots has {} entries", s.len()))),
    };

    Ok(StatusResult {
        proto: required(uint(&map, "proto")?, "proto")?,
        ver: required(text(&map, "ver")?, "ver")?,
        birth: required(uint(&map, "birth")?, "birth")?,
        slots,
        addr: text(&map, "addr")?,
        tapsigner: flag(&map, "tapsigner")?,
        satschip: flag(&map, "satschip")?,
        path: uint_list(&map, "path")?,
        num_backups: uint(&map, "num_backups")?,
        pubkey: required(bytes(&map, "pubkey")?, "pubkey")?,
        card_nonce: required(bytes(&map, "card_nonce")?, "card_nonce")?,
        testnet: flag(&map, "testnet")?,
        auth_delay: uint(&map, "auth_delay")?,
    })
}
