//! Hexadecimal codec used for logging and display.
//!
//! Encoding is lowercase with two characters per byte and no separators.
//! Decoding is strict: the input must have even length and contain only hex
//! digits, otherwise a [`HexError`] is returned.

use thiserror::Error;

/// Failure to decode a hex string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// Input length is not a multiple of two.
    #[error("hex string has odd length {0}")]
    OddLength(usize),

    /// Two characters that are not both hex digits.
    #[error("invalid hex pair {pair:?} at offset {index}")]
    InvalidPair {
        /// Byte offset of the pair in the input.
        index: usize,
        /// The offending characters.
        pair: String,
    },
}

/// Convert a byte slice to a lowercase hex string without separators.
///
/// Example: `&[0xde, 0xad]` -> `"dead"`
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        use std::fmt::Write;
        // write! never fails writing to a String
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

/// Parse a hex string into bytes, two characters per byte.
///
/// Upper- and lowercase digits are accepted. Whitespace is not.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, HexError> {
    let raw = s.as_bytes();
    if raw.len() % 2 != 0 {
        return Err(HexError::OddLength(raw.len()));
    }

    let mut out = Vec::with_capacity(raw.len() / 2);
    for (i, pair) in raw.chunks_exact(2).enumerate() {
        match (nibble(pair[0]), nibble(pair[1])) {
            (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
            _ => {
                return Err(HexError::InvalidPair {
                    index: i * 2,
                    pair: String::from_utf8_lossy(pair).into_owned(),
                });
            }
        }
    }

    Ok(out)
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
