//! dirlock-crypto: keyed obfuscation primitives for dirlock
//!
//! Pipeline: password → alternating byte fold → DerivedKey → additive byte
//! shift → base64 transport encoding.
//!
//! The cipher here is reversible obfuscation, not cryptography: every byte is
//! shifted by the same key modulo 256 and the result is base64-encoded so it
//! survives text transports and filenames. The same key decrypts by shifting
//! back. Mismatch detection is not the cipher's job — decoding with the wrong
//! key yields garbled bytes, never an error.

pub mod cipher;
pub mod hash;
pub mod kdf;
pub mod names;

pub use cipher::{decode, encode};
pub use hash::{make as make_digest, verify as verify_digest, HashAlgorithm};
pub use kdf::{derive, DerivedKey};
pub use names::{decrypt_name, encrypt_name};

/// Minimum accepted password length (in characters)
pub const MIN_PASSWORD_LEN: usize = 5;
