//! Key derivation: password → deterministic non-negative integer key

use secrecy::{ExposeSecret, SecretString};

use dirlock_core::{DirlockError, DirlockResult};

use crate::MIN_PASSWORD_LEN;

/// Integer key derived from a password, used identically for encrypt and
/// decrypt. Only the low 8 bits matter to the cipher's modular shift, but the
/// full value is kept so two passwords with different folds stay
/// distinguishable in tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedKey(u32);

impl DerivedKey {
    pub fn value(self) -> u32 {
        self.0
    }

    /// Construct from a raw value. Intended for tests and for callers that
    /// cache a previously derived key.
    pub fn from_raw(value: u32) -> Self {
        DerivedKey(value)
    }
}

/// Derive the cipher key from a password.
///
/// The fold alternates adding and subtracting each password byte starting in
/// the "add" state, takes the absolute value, and adds the password length.
/// Deterministic: the same password always yields the same key.
pub fn derive(password: &SecretString) -> DirlockResult<DerivedKey> {
    let secret = password.expose_secret();
    if secret.chars().count() < MIN_PASSWORD_LEN {
        return Err(DirlockError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok(DerivedKey(alternating_fold(secret.as_bytes())))
}

/// The alternating add/subtract fold shared by `derive` and the legacy
/// `shift64` digest. Operates on raw bytes so non-ASCII input is well-defined.
pub(crate) fn alternating_fold(bytes: &[u8]) -> u32 {
    let mut acc: i64 = 0;
    let mut add = true;
    for &b in bytes {
        if add {
            acc += i64::from(b);
        } else {
            acc -= i64::from(b);
        }
        add = !add;
    }
    if acc < 0 {
        acc = -acc;
    }
    acc += bytes.len() as i64;
    // Oversized folds (tens of megabytes of input) wrap to the low 32 bits
    (acc & i64::from(u32::MAX)) as u32
}
