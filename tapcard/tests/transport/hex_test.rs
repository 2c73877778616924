use proptest::prelude::*;
use tapcard::utils::{HexError, decode_hex, encode_hex};

#[test]
fn logs_and_fixtures_use_lowercase() {
    assert_eq!(encode_hex(&[0x00, 0xA4, 0x04, 0x00]), "00a40400");
    assert_eq!(decode_hex("00A40400").unwrap(), vec![0x00, 0xA4, 0x04, 0x00]);
}

#[test]
fn malformed_text_is_rejected() {
    assert_eq!(decode_hex("abc"), Err(HexError::OddLength(3)));
    assert!(matches!(
        decode_hex("00 a4"),
        Err(HexError::OddLength(_)) | Err(HexError::InvalidPair { .. })
    ));
    assert!(matches!(decode_hex("zz"), Err(HexError::InvalidPair { index: 0, .. })));
}

proptest! {
    #[test]
    fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        prop_assert_eq!(decode_hex(&encode_hex(&bytes)).unwrap(), bytes);
    }
}
