//! Batch processor: directory-wide encrypt/decrypt
//!
//! State machine per directory: UNINITIALIZED (no config) → ENCRYPTED (config
//! present, entries transformed) → DECRYPTED (entries restored, config
//! optionally removed). `encrypt` drives the first transition and may be
//! re-run against an ENCRYPTED directory after reconciling with the stored
//! config; `decrypt` drives the second and verifies the password digest
//! before touching any entry.
//!
//! Per-entry isolation: one entry's failure never aborts the batch. Failed
//! entries are recorded in the report and, on encrypt, appended to the
//! persisted ignore list so later runs leave them alone.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use dirlock_core::{BatchReport, DirectoryState, DirlockError, DirlockResult};
use dirlock_crypto::{self as crypto, DerivedKey, HashAlgorithm};

use crate::codec;
use crate::store::{self, VaultConfig, CONFIG_FILE_NAME};

/// Progress callback type (entries_done, entries_total, entry_name).
/// Invoked after each entry completes, so `entries_done` ends at the total.
pub type ProgressFn = Box<dyn Fn(u64, u64, &str) + Send + Sync>;

/// State of a directory, decided by the presence of its config file.
pub fn directory_state(directory: &Path) -> DirectoryState {
    if store::exists(directory) {
        DirectoryState::Encrypted
    } else {
        DirectoryState::Uninitialized
    }
}

/// Encrypt every non-ignored entry of `directory` in place.
///
/// Loads the existing config (reconciling the password and merging
/// `extra_ignore`) or creates one on first use. Subdirectories are always
/// skipped. Entries that fail are added to the ignore list and reported; the
/// batch continues. The config is persisted after the batch — even when some
/// entries failed — with `last_modified` refreshed from the second run on.
pub fn encrypt(
    directory: &Path,
    password: &SecretString,
    extra_ignore: &[String],
    progress: Option<&ProgressFn>,
) -> DirlockResult<BatchReport> {
    let key = crypto::derive(password)?;
    let digest = password_digest(password);

    let preexisting = store::exists(directory);
    let mut config = if preexisting {
        let existing = store::load(directory)?;
        if existing.password != digest {
            return Err(DirlockError::PasswordMismatch);
        }
        existing
    } else {
        VaultConfig::new(digest, Vec::new())
    };
    config.merge_ignore(extra_ignore);

    let entries = list_entries(directory)?;
    let total = entries.len() as u64;
    let mut report = BatchReport::default();

    for (i, name) in entries.iter().enumerate() {
        if config.is_ignored(name) {
            report.record_skip(name);
        } else {
            match encrypt_entry(directory, name, key) {
                Ok(()) => report.record_success(name),
                Err(e) => {
                    warn!(entry = %name, "encrypt failed: {e}");
                    config.merge_ignore(std::slice::from_ref(name));
                    report.record_failure(name, e.to_string());
                }
            }
        }

        if let Some(cb) = progress {
            cb(i as u64 + 1, total, name);
        }
    }

    // last_modified keeps its creation sentinel on the first run and is
    // refreshed on every later one
    if preexisting {
        config.touch();
    }
    store::save(directory, &config)?;

    info!(
        directory = %directory.display(),
        succeeded = report.succeeded.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "encrypt batch finished"
    );
    Ok(report)
}

/// Decrypt every entry of `directory` using its own config file.
///
/// Fails fast with `PasswordMismatch` — leaving every entry byte-identical —
/// when the password's digest does not equal the stored one. When every entry
/// succeeded and `remove_config` is set, the config file is deleted.
pub fn decrypt(
    directory: &Path,
    password: &SecretString,
    remove_config: bool,
    progress: Option<&ProgressFn>,
) -> DirlockResult<BatchReport> {
    let config = store::load(directory)?;
    decrypt_with_config(directory, password, &config, remove_config, progress)
}

/// Decrypt with a caller-supplied config (recovery path: the directory's own
/// config file is missing or intentionally bypassed).
pub fn decrypt_with_config(
    directory: &Path,
    password: &SecretString,
    config: &VaultConfig,
    remove_config: bool,
    progress: Option<&ProgressFn>,
) -> DirlockResult<BatchReport> {
    let key = crypto::derive(password)?;
    if password_digest(password) != config.password {
        return Err(DirlockError::PasswordMismatch);
    }

    let entries = list_entries(directory)?;
    let total = entries.len() as u64;
    let mut report = BatchReport::default();

    for (i, name) in entries.iter().enumerate() {
        // Ignored entries were never renamed, so the on-disk name matches
        if config.is_ignored(name) {
            report.record_skip(name);
        } else {
            match decrypt_entry(directory, name, config, key) {
                Ok(EntryOutcome::Restored(original)) => report.record_success(original),
                Ok(EntryOutcome::Ignored(original)) => report.record_skip(original),
                Err(e) => {
                    warn!(entry = %name, "decrypt failed: {e}");
                    report.record_failure(name, e.to_string());
                }
            }
        }

        if let Some(cb) = progress {
            cb(i as u64 + 1, total, name);
        }
    }

    if report.is_clean() && remove_config && store::exists(directory) {
        store::remove(directory)?;
        info!(directory = %directory.display(), "config removed after full decrypt");
    }

    info!(
        directory = %directory.display(),
        succeeded = report.succeeded.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "decrypt batch finished"
    );
    Ok(report)
}

enum EntryOutcome {
    Restored(String),
    Ignored(String),
}

fn encrypt_entry(directory: &Path, name: &str, key: DerivedKey) -> DirlockResult<()> {
    let path = directory.join(name);
    codec::encrypt_file(&path, key)?;
    let encrypted_name = crypto::encrypt_name(name, key);
    std::fs::rename(&path, directory.join(&encrypted_name))?;
    Ok(())
}

fn decrypt_entry(
    directory: &Path,
    name: &str,
    config: &VaultConfig,
    key: DerivedKey,
) -> DirlockResult<EntryOutcome> {
    // Name first: classification and the ignore check both need the original
    let original = crypto::decrypt_name(name, key)
        .map_err(|e| DirlockError::for_entry(name, e))?;

    if config.is_ignored(&original) {
        return Ok(EntryOutcome::Ignored(original));
    }

    let path = directory.join(name);
    codec::decrypt_file(&path, &original, key)
        .map_err(|e| DirlockError::for_entry(name, e))?;
    std::fs::rename(&path, directory.join(&original))?;
    Ok(EntryOutcome::Restored(original))
}

/// Collect the directory's entry names, skipping subdirectories and the
/// config file. Sorted for deterministic processing order.
fn list_entries(directory: &Path) -> DirlockResult<Vec<String>> {
    if !directory.is_dir() {
        return Err(DirlockError::Validation(format!(
            "not a directory: {}",
            directory.display()
        )));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == CONFIG_FILE_NAME {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

fn password_digest(password: &SecretString) -> String {
    crypto::make_digest(password.expose_secret(), HashAlgorithm::Md5)
}
