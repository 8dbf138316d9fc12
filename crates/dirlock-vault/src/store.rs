//! Persisted per-directory vault config
//!
//! A single fixed-name file (`.dirlock`) inside the target directory holds a
//! base64-encoded JSON document: schema version, the password's MD5 digest,
//! the ignore list, and creation/modification timestamps. The store validates
//! on load and writes atomically via temp+rename.
//!
//! Schema history: v1 additionally stored an `originalfilenames` map, made
//! obsolete by the reversible filename cipher. v1 documents are rejected with
//! a config-format error; there is no migration path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dirlock_core::{DirlockError, DirlockResult};

/// Fixed name of the config file inside a vault directory
pub const CONFIG_FILE_NAME: &str = ".dirlock";

/// Current config schema version
pub const CONFIG_VERSION: u32 = 2;

/// Sentinel for "never modified since creation"
const NEVER_MODIFIED: f64 = 0.0;

/// An MD5 hex digest is 32 characters; anything shorter cannot be one
const MIN_DIGEST_LEN: usize = 32;

/// Per-directory vault metadata.
///
/// The `password` field holds the digest hex, never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    pub version: u32,
    pub password: String,
    pub ignorefiles: Vec<String>,
    pub created_on: f64,
    pub last_modified: f64,
}

impl VaultConfig {
    /// Build a fresh config for a directory being encrypted the first time.
    pub fn new(password_digest: String, ignorefiles: Vec<String>) -> Self {
        VaultConfig {
            version: CONFIG_VERSION,
            password: password_digest,
            ignorefiles,
            created_on: epoch_now(),
            last_modified: NEVER_MODIFIED,
        }
    }

    /// Merge extra ignore names, preserving order and dropping duplicates.
    pub fn merge_ignore(&mut self, extra: &[String]) {
        for name in extra {
            if !self.ignorefiles.iter().any(|n| n == name) {
                self.ignorefiles.push(name.clone());
            }
        }
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignorefiles.iter().any(|n| n == name)
    }

    /// Refresh `last_modified` to the current time.
    pub fn touch(&mut self) {
        self.last_modified = epoch_now();
    }

    /// Serialize to the on-disk form: JSON, then base64.
    pub fn to_bytes(&self) -> DirlockResult<Vec<u8>> {
        let json = serde_json::to_vec(self)
            .map_err(|e| DirlockError::ConfigFormat(format!("serializing config: {e}")))?;
        Ok(STANDARD.encode(json).into_bytes())
    }

    /// Parse and validate the on-disk form.
    pub fn from_bytes(blob: &[u8]) -> DirlockResult<Self> {
        let text = std::str::from_utf8(blob)
            .map_err(|e| DirlockError::ConfigFormat(format!("config is not text: {e}")))?;
        let json = STANDARD
            .decode(text.trim())
            .map_err(|e| DirlockError::ConfigFormat(format!("config transport decode: {e}")))?;
        let config: VaultConfig = serde_json::from_slice(&json)
            .map_err(|e| DirlockError::ConfigFormat(format!("parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> DirlockResult<()> {
        if self.version != CONFIG_VERSION {
            return Err(DirlockError::ConfigFormat(format!(
                "unsupported config version {} (expected {CONFIG_VERSION})",
                self.version
            )));
        }
        if self.password.len() < MIN_DIGEST_LEN {
            return Err(DirlockError::ConfigFormat(
                "stored password digest is too short".into(),
            ));
        }
        if self.created_on < 0.0 || self.last_modified < 0.0 {
            return Err(DirlockError::ConfigFormat(
                "timestamps must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Path of the config file inside `directory`
pub fn config_path(directory: &Path) -> PathBuf {
    directory.join(CONFIG_FILE_NAME)
}

/// Whether `directory` already has a config file
pub fn exists(directory: &Path) -> bool {
    config_path(directory).is_file()
}

/// Load the directory's own config file.
pub fn load(directory: &Path) -> DirlockResult<VaultConfig> {
    let path = config_path(directory);
    if !path.is_file() {
        return Err(DirlockError::ConfigFormat(format!(
            "no config file at {}",
            path.display()
        )));
    }
    load_from_path(&path)
}

/// Load a config from an alternate file path (recovery: the directory's own
/// config is missing or intentionally bypassed).
pub fn load_from_path(path: &Path) -> DirlockResult<VaultConfig> {
    let blob = std::fs::read(path)?;
    let config = VaultConfig::from_bytes(&blob)?;
    debug!(path = %path.display(), ignored = config.ignorefiles.len(), "config loaded");
    Ok(config)
}

/// Load a config from a caller-supplied blob in the on-disk format.
pub fn load_from_blob(blob: &[u8]) -> DirlockResult<VaultConfig> {
    VaultConfig::from_bytes(blob)
}

/// Write the config into `directory` with a temp+rename so readers never see
/// a half-written file. The temp file gets a randomized name so it cannot
/// collide with an entry in the directory.
pub fn save(directory: &Path, config: &VaultConfig) -> DirlockResult<()> {
    let path = config_path(directory);
    let bytes = config.to_bytes()?;
    let mut tmp = tempfile::NamedTempFile::new_in(directory)?;
    tmp.write_all(&bytes)?;
    tmp.persist(&path)
        .map_err(|e| DirlockError::Io(e.error))?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

/// Remove the config file. Only called after a fully successful decrypt with
/// explicit caller confirmation.
pub fn remove(directory: &Path) -> DirlockResult<()> {
    std::fs::remove_file(config_path(directory))?;
    Ok(())
}

fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
