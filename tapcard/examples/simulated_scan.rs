// Full scan against a simulated radio and SATSCARD.
//
// Run with `RUST_LOG=debug cargo run --example simulated_scan` to see the
// APDU trace and session transitions.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_cbor::Value;
use tapcard::prelude::*;
use tapcard::radio::{MockRadio, MockTag};

fn satscard_reply() -> anyhow::Result<WireReply> {
    let mut status = BTreeMap::new();
    let mut put = |k: &str, v: Value| {
        status.insert(Value::Text(k.to_string()), v);
    };
    put("proto", Value::Integer(1));
    put("ver", Value::Text("1.0.3".into()));
    put("birth", Value::Integer(700_123));
    put("slots", Value::Array(vec![Value::Integer(0), Value::Integer(10)]));
    put("addr", Value::Text("bc1qxy2...0wlh".into()));
    put("pubkey", Value::Bytes(decode_hex(
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
    )?));
    put("card_nonce", Value::Bytes(vec![0x42; 16]));
    Ok(WireReply::ok(serde_cbor::to_vec(&Value::Map(status))?))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let tag = Arc::new(MockTag::new());
    tag.push_reply(satscard_reply()?);
    let radio = MockRadio::new();
    radio.discover(vec![Tag::Iso7816(tag)]);

    let mut controller = ScanController::builder()
        .with_radio(Box::new(radio))
        .with_client(Arc::new(StatusClient::new()))
        .with_config(SessionConfig::builder().exchange_timeout_ms(2_000).build())
        .build()?;
    let events = controller.subscribe();

    println!("{}", controller.status_message());
    let generation = controller.begin_scan();
    let outcome = controller.process_until_terminal(Duration::from_secs(5));

    for event in events.try_iter() {
        println!("[{}] {:?}", generation, event);
    }
    println!("{}", controller.status_message());

    match (outcome, controller.last_status()) {
        (Some(SessionState::Succeeded), Some(status)) => {
            println!("card:    {:?} v{}", status.kind(), status.ver);
            println!("slot:    {:?}", status.active_slot());
            println!("pubkey:  {}", status.pubkey_hex());
            if let Some(addr) = &status.addr {
                println!("address: {}", addr);
            }
        }
        (state, _) => println!("scan ended without status: {:?}", state),
    }
    Ok(())
}
