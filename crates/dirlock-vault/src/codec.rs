//! Whole-file content transforms
//!
//! Encrypt replaces a file's bytes with the cipher's base64 text; decrypt
//! restores the original bytes. Image files (classified by extension) carry a
//! base64 pre-pass: the raw bytes are base64-encoded before ciphering and
//! base64-decoded after, an on-disk format kept from the original scheme.
//!
//! Every failure here is scoped to the one file being transformed; the batch
//! layer records it and moves on. Writes go through temp+rename, so a failed
//! transform leaves the original content in place.

use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::NamedTempFile;
use tracing::debug;

use dirlock_core::{DirlockError, DirlockResult};
use dirlock_crypto::{cipher, DerivedKey};

/// Extensions classified as image content (case-insensitive)
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "ico", "tif", "tiff",
];

/// Whether a filename is classified as image content, by extension.
pub fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|&i| i == ext)
        })
        .unwrap_or(false)
}

/// Encrypt a file's content in place.
///
/// The file's own name decides the image classification; it still carries the
/// original name when this runs (content first, rename after).
pub fn encrypt_file(path: &Path, key: DerivedKey) -> DirlockResult<()> {
    let name = file_name(path);
    let raw = std::fs::read(path)?;

    let cipher_text = if is_image(&name) {
        let pre = STANDARD.encode(&raw);
        cipher::encode(pre.as_bytes(), key)
    } else {
        cipher::encode(&raw, key)
    };

    write_replacing(path, cipher_text.as_bytes())?;
    debug!(path = %path.display(), bytes = raw.len(), image = is_image(&name), "content encrypted");
    Ok(())
}

/// Decrypt a file's content in place.
///
/// `original_name` is the decrypted filename; the on-disk name is still the
/// encrypted one, so classification must come from the caller.
pub fn decrypt_file(path: &Path, original_name: &str, key: DerivedKey) -> DirlockResult<()> {
    let content = std::fs::read_to_string(path)?;
    let decoded = cipher::decode(&content, key)?;

    let restored = if is_image(original_name) {
        let pre = std::str::from_utf8(&decoded)
            .map_err(|e| DirlockError::Encoding(format!("image pre-pass is not text: {e}")))?;
        STANDARD
            .decode(pre.trim_end())
            .map_err(|e| DirlockError::Encoding(format!("image base64 decode: {e}")))?
    } else {
        decoded
    };

    write_replacing(path, &restored)?;
    debug!(path = %path.display(), bytes = restored.len(), "content decrypted");
    Ok(())
}

/// Replace a file's content via temp+rename so a failure mid-write never
/// leaves a truncated file. The temp file gets a randomized name in the same
/// directory, so it cannot collide with a sibling entry.
fn write_replacing(path: &Path, content: &[u8]) -> DirlockResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.persist(path).map_err(|e| DirlockError::Io(e.error))?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
