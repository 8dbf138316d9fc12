//! Multi-algorithm digest utility
//!
//! A fixed set of standard digests (RustCrypto `Digest` implementations) plus
//! `shift64`, a legacy non-cryptographic scheme built from the same additive
//! shift the cipher uses. The legacy identifier is tagged distinctly so
//! callers can tell it apart from the standard family.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use dirlock_core::{DirlockError, DirlockResult};

use crate::kdf::alternating_fold;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    /// Legacy additive-shift digest; not cryptographic
    Shift64,
}

impl HashAlgorithm {
    /// The standard family, in the order `verify` probes them.
    pub const STANDARD: [HashAlgorithm; 6] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Every supported algorithm: the standard family, then the legacy one.
    pub fn all() -> impl Iterator<Item = HashAlgorithm> {
        Self::STANDARD
            .into_iter()
            .chain(std::iter::once(HashAlgorithm::Shift64))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Shift64 => "shift64",
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = DirlockError;

    fn from_str(s: &str) -> DirlockResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "shift64" => Ok(HashAlgorithm::Shift64),
            other => Err(DirlockError::Validation(format!(
                "unknown hash algorithm '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the hex digest of `text` under the given algorithm.
pub fn make(text: &str, algorithm: HashAlgorithm) -> String {
    let data = text.as_bytes();
    match algorithm {
        HashAlgorithm::Md5 => to_hex(&Md5::digest(data)),
        HashAlgorithm::Sha1 => to_hex(&Sha1::digest(data)),
        HashAlgorithm::Sha224 => to_hex(&Sha224::digest(data)),
        HashAlgorithm::Sha256 => to_hex(&Sha256::digest(data)),
        HashAlgorithm::Sha384 => to_hex(&Sha384::digest(data)),
        HashAlgorithm::Sha512 => to_hex(&Sha512::digest(data)),
        HashAlgorithm::Shift64 => shift64(data),
    }
}

/// Check whether `original` is a digest of `text`.
///
/// With an algorithm given, recompute and compare. Without one, probe the
/// standard family in order and then the legacy scheme, returning true on the
/// first match. Stateless; safe to call repeatedly.
pub fn verify(text: &str, original: &str, algorithm: Option<HashAlgorithm>) -> bool {
    match algorithm {
        Some(algo) => make(text, algo) == original,
        None => HashAlgorithm::all().any(|algo| make(text, algo) == original),
    }
}

/// Legacy digest: fold the additively-shifted input into a fixed 8-byte
/// state. 16 hex chars, visually distinct from every standard digest length.
fn shift64(data: &[u8]) -> String {
    let key = alternating_fold(data);
    let mut state = [0u8; 8];
    for (i, &b) in data.iter().enumerate() {
        let shifted = ((u32::from(b) + key) % 256) as u8;
        state[i % 8] = state[i % 8].wrapping_add(shifted).rotate_left(3);
    }
    for (i, len_byte) in (data.len() as u64).to_le_bytes().into_iter().enumerate() {
        state[i] ^= len_byte;
    }
    to_hex(&state)
}

fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        s.push_str(&format!("{byte:02x}"));
    }
    s
}
