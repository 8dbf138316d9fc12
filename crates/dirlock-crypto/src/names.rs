//! Reversible filename transform
//!
//! Applies the additive cipher to the filename's UTF-8 bytes and encodes with
//! the URL-safe no-pad base64 alphabet, so the encrypted name never contains
//! `/`, `+` or `=` and is valid on every common filesystem.
//!
//! Collisions (two distinct names encrypting to the same string) cannot occur
//! for a fixed key since the transform is injective, but two directories
//! keyed differently may map different names onto the same encrypted name.
//! That case is not detected; it is an accepted limitation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use dirlock_core::{DirlockError, DirlockResult};

use crate::cipher::{shift, unshift};
use crate::kdf::DerivedKey;

/// Encrypt a filename. The result is used directly as the on-disk name.
pub fn encrypt_name(name: &str, key: DerivedKey) -> String {
    URL_SAFE_NO_PAD.encode(shift(name.as_bytes(), key))
}

/// Recover the original filename from an encrypted on-disk name.
///
/// Fails when the input was not produced by [`encrypt_name`] (bad alphabet)
/// or when the shifted-back bytes are not valid UTF-8 — both typical for
/// entries that were never renamed, e.g. ignored files.
pub fn decrypt_name(encrypted: &str, key: DerivedKey) -> DirlockResult<String> {
    let raw = URL_SAFE_NO_PAD
        .decode(encrypted)
        .map_err(|e| DirlockError::Encoding(format!("filename base64 decode: {e}")))?;
    String::from_utf8(unshift(&raw, key))
        .map_err(|e| DirlockError::Encoding(format!("decrypted name is not UTF-8: {e}")))
}
