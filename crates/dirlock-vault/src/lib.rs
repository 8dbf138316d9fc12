//! dirlock-vault: per-directory obfuscation vault
//!
//! Orchestration layer over the dirlock-crypto primitives:
//! - `store`: the persisted `.dirlock` config (digest, ignore list, timestamps)
//! - `codec`: whole-file content transforms, with a base64 pre-pass for images
//! - `batch`: directory-wide encrypt/decrypt with per-entry failure isolation
//!
//! Everything is synchronous and single-threaded; each entry is fully
//! transformed before the next is considered. There is no cross-entry
//! rollback — interruption mid-batch leaves a mixed directory, and only the
//! per-entry report tells the caller what happened.

pub mod batch;
pub mod codec;
pub mod store;

pub use batch::{decrypt, decrypt_with_config, directory_state, encrypt, ProgressFn};
pub use store::{VaultConfig, CONFIG_FILE_NAME, CONFIG_VERSION};
