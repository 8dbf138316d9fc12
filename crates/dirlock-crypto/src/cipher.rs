//! Additive byte cipher with base64 transport encoding
//!
//! `encode` shifts every input byte by `+key mod 256` and base64-encodes the
//! shifted bytes; `decode` reverses both steps. Shifting raw bytes (rather
//! than text code points) keeps the transform total: any input, including
//! binary, round-trips under the same key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use dirlock_core::{DirlockError, DirlockResult};

use crate::kdf::DerivedKey;

/// Shift every byte forward by the key, modulo 256.
pub(crate) fn shift(data: &[u8], key: DerivedKey) -> Vec<u8> {
    let k = key.value() % 256;
    data.iter()
        .map(|&b| ((u32::from(b) + k) % 256) as u8)
        .collect()
}

/// Shift every byte back by the key. Euclidean modulo keeps the result in
/// `[0, 256)` even when the subtraction goes negative.
pub(crate) fn unshift(data: &[u8], key: DerivedKey) -> Vec<u8> {
    let k = i64::from(key.value() % 256);
    data.iter()
        .map(|&b| (i64::from(b) - k).rem_euclid(256) as u8)
        .collect()
}

/// Encipher `data` under `key` and return transport-safe base64 text.
pub fn encode(data: &[u8], key: DerivedKey) -> String {
    STANDARD.encode(shift(data, key))
}

/// Invert [`encode`]: base64-decode, then shift every byte back.
///
/// Fails only on malformed transport text. A wrong key is not detectable
/// here — it produces garbled output, and catching that is the config
/// store's digest check, not the cipher's.
pub fn decode(text: &str, key: DerivedKey) -> DirlockResult<Vec<u8>> {
    let raw = STANDARD
        .decode(text.trim_end())
        .map_err(|e| DirlockError::Encoding(format!("base64 decode: {e}")))?;
    Ok(unshift(&raw, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(v: u32) -> DerivedKey {
        DerivedKey::from_raw(v)
    }

    #[test]
    fn roundtrip_simple_text() {
        let k = key(43); // derive("secret123")
        let encoded = encode(b"Hello, World!", k);
        let decoded = decode(&encoded, k).unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn wrong_key_garbles_but_does_not_error() {
        let right = key(43);
        let wrong = key(44);
        let encoded = encode(b"Hello, World!", right);
        let decoded = decode(&encoded, wrong).unwrap();
        assert_ne!(decoded, b"Hello, World!");
    }

    #[test]
    fn roundtrip_binary_content() {
        let k = key(200);
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&data, k), k).unwrap(), data);
    }

    #[test]
    fn zero_key_is_identity_shift() {
        let k = key(0);
        assert_eq!(decode(&encode(b"abc", k), k).unwrap(), b"abc");
    }

    #[test]
    fn key_wraps_modulo_256() {
        // 256 and 0 shift identically
        assert_eq!(encode(b"data", key(256)), encode(b"data", key(0)));
    }

    #[test]
    fn malformed_transport_text_is_an_encoding_error() {
        let err = decode("!!!not-base64!!!", key(7)).unwrap_err();
        assert!(matches!(err, dirlock_core::DirlockError::Encoding(_)));
    }

    #[test]
    fn derived_key_scenario() {
        use crate::kdf::derive;
        use secrecy::SecretString;

        let right = derive(&SecretString::from("secret123")).unwrap();
        let wrong = derive(&SecretString::from("wrongpass")).unwrap();

        let cipher_text = encode(b"Hello, World!", right);
        assert_eq!(decode(&cipher_text, right).unwrap(), b"Hello, World!");
        // wrong key garbles silently; mismatch detection is the config
        // store's digest check, not the cipher's
        assert_ne!(decode(&cipher_text, wrong).unwrap(), b"Hello, World!");
    }

    proptest! {
        #[test]
        fn roundtrip_any_bytes_any_key(data in proptest::collection::vec(any::<u8>(), 0..2048), k in 0u32..100_000) {
            let k = key(k);
            prop_assert_eq!(decode(&encode(&data, k), k).unwrap(), data);
        }
    }
}
