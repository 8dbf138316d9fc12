//! End-to-end batch tests over tempdir fixtures.
//!
//! Covers the full encrypt/decrypt flow, fail-fast on a wrong password,
//! per-entry failure isolation, and ignore-list semantics.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

use dirlock_vault::{batch, store, CONFIG_FILE_NAME};

fn password() -> SecretString {
    SecretString::from("secret123")
}

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

/// Snapshot every entry (name → content bytes) except the config file.
fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut map = BTreeMap::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == CONFIG_FILE_NAME {
            continue;
        }
        map.insert(name, std::fs::read(entry.path()).unwrap());
    }
    map
}

#[test]
fn directory_state_follows_config_presence() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");

    use dirlock_core::DirectoryState;
    assert_eq!(
        batch::directory_state(tmp.path()),
        DirectoryState::Uninitialized
    );

    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    assert_eq!(batch::directory_state(tmp.path()), DirectoryState::Encrypted);

    batch::decrypt(tmp.path(), &password(), true, None).unwrap();
    assert_eq!(
        batch::directory_state(tmp.path()),
        DirectoryState::Uninitialized
    );
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "notes.txt", b"Hello, World!");
    write_file(tmp.path(), "todo.md", b"- buy milk\n- water plants\n");
    write_file(
        tmp.path(),
        "photo.png",
        &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0xde, 0xad],
    );
    let before = snapshot(tmp.path());

    let report = batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    assert_eq!(report.succeeded.len(), 3);
    assert!(report.is_clean());
    assert!(store::exists(tmp.path()));

    // all names and contents transformed
    let encrypted = snapshot(tmp.path());
    for name in before.keys() {
        assert!(!encrypted.contains_key(name), "{name} was not renamed");
    }

    let report = batch::decrypt(tmp.path(), &password(), false, None).unwrap();
    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(snapshot(tmp.path()), before);
    // config stays without explicit removal confirmation
    assert!(store::exists(tmp.path()));
}

#[test]
fn wrong_password_fails_fast_and_mutates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");
    write_file(tmp.path(), "b.txt", b"beta");

    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    let before = snapshot(tmp.path());

    let err = batch::decrypt(tmp.path(), &SecretString::from("wrongpass"), true, None).unwrap_err();
    assert!(matches!(err, dirlock_core::DirlockError::PasswordMismatch));

    // every entry byte-identical, config untouched
    assert_eq!(snapshot(tmp.path()), before);
    assert!(store::exists(tmp.path()));
}

#[test]
fn re_encrypt_rejects_disagreeing_password() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");
    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();

    let err = batch::encrypt(tmp.path(), &SecretString::from("wrongpass"), &[], None).unwrap_err();
    assert!(matches!(err, dirlock_core::DirlockError::PasswordMismatch));
}

#[test]
fn ignored_entries_are_exempt_both_directions() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "secret.txt", b"hide me");
    write_file(tmp.path(), "keep.txt", b"leave me alone");

    let report = batch::encrypt(tmp.path(), &password(), &["keep.txt".into()], None).unwrap();
    assert_eq!(report.succeeded, vec!["secret.txt"]);
    assert_eq!(report.skipped, vec!["keep.txt"]);

    // ignored file untouched by name and content
    assert_eq!(
        std::fs::read(tmp.path().join("keep.txt")).unwrap(),
        b"leave me alone"
    );

    let report = batch::decrypt(tmp.path(), &password(), false, None).unwrap();
    assert_eq!(report.skipped, vec!["keep.txt"]);
    assert_eq!(
        std::fs::read(tmp.path().join("secret.txt")).unwrap(),
        b"hide me"
    );
}

#[test]
fn per_entry_failure_is_isolated_and_recorded() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");
    write_file(tmp.path(), "b.txt", b"beta");
    // dangling symlink: listed, but unreadable
    std::os::unix::fs::symlink("/nonexistent/target", tmp.path().join("broken.txt")).unwrap();

    let report = batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "broken.txt");

    // the failed entry's original name is in the persisted ignore list
    let config = store::load(tmp.path()).unwrap();
    assert!(config.is_ignored("broken.txt"));

    // decrypt skips the failed entry (its on-disk name was never changed)
    let report = batch::decrypt(tmp.path(), &password(), false, None).unwrap();
    assert!(report.is_clean());
    assert!(report.skipped.contains(&"broken.txt".to_string()));
}

#[test]
fn corrupted_entry_fails_decrypt_but_batch_continues() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");
    write_file(tmp.path(), "b.txt", b"beta");

    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();

    // corrupt one encrypted entry's content
    let victim = snapshot(tmp.path()).keys().next().unwrap().clone();
    std::fs::write(tmp.path().join(&victim), b"!!!corrupted!!!").unwrap();

    let report = batch::decrypt(tmp.path(), &password(), true, None).unwrap();
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    // a non-clean decrypt must not remove the config even when asked to
    assert!(store::exists(tmp.path()));
}

#[test]
fn remove_config_after_clean_decrypt() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");

    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    let report = batch::decrypt(tmp.path(), &password(), true, None).unwrap();

    assert!(report.is_clean());
    assert!(!store::exists(tmp.path()));
    assert_eq!(std::fs::read(tmp.path().join("a.txt")).unwrap(), b"alpha");
}

#[test]
fn subdirectories_are_always_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "top.txt", b"top");
    std::fs::create_dir(tmp.path().join("nested")).unwrap();
    write_file(&tmp.path().join("nested"), "inner.txt", b"inner");

    let report = batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    assert_eq!(report.succeeded, vec!["top.txt"]);

    // nested entry untouched
    assert_eq!(
        std::fs::read(tmp.path().join("nested/inner.txt")).unwrap(),
        b"inner"
    );
}

#[test]
fn re_encrypt_merges_extra_ignore() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");
    batch::encrypt(tmp.path(), &password(), &["x.bin".into()], None).unwrap();
    batch::encrypt(tmp.path(), &password(), &["y.bin".into(), "x.bin".into()], None).unwrap();

    let config = store::load(tmp.path()).unwrap();
    assert!(config.is_ignored("x.bin"));
    assert!(config.is_ignored("y.bin"));
    assert_eq!(
        config
            .ignorefiles
            .iter()
            .filter(|n| n.as_str() == "x.bin")
            .count(),
        1
    );
}

#[test]
fn last_modified_sentinel_then_refresh() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");

    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    let config = store::load(tmp.path()).unwrap();
    // first encrypt keeps the "never modified" sentinel
    assert_eq!(config.last_modified, 0.0);
    assert!(config.created_on > 0.0);

    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    let config = store::load(tmp.path()).unwrap();
    assert!(config.last_modified > 0.0);
}

#[test]
fn decrypt_with_alternate_config_blob() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");
    batch::encrypt(tmp.path(), &password(), &[], None).unwrap();

    // stash the config elsewhere, then delete the directory's own copy
    let blob = std::fs::read(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
    std::fs::remove_file(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
    assert!(batch::decrypt(tmp.path(), &password(), false, None).is_err());

    let config = store::load_from_blob(&blob).unwrap();
    let report =
        batch::decrypt_with_config(tmp.path(), &password(), &config, false, None).unwrap();
    assert!(report.is_clean());
    assert_eq!(std::fs::read(tmp.path().join("a.txt")).unwrap(), b"alpha");
}

#[test]
fn entry_named_like_a_temp_file_survives_encrypt() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.bin", b"binary");
    write_file(tmp.path(), "a.dirlock_tmp", b"precious");

    let report = batch::encrypt(tmp.path(), &password(), &[], None).unwrap();
    assert!(report.is_clean(), "failed: {:?}", report.failed);
    assert_eq!(report.succeeded.len(), 2);

    let report = batch::decrypt(tmp.path(), &password(), false, None).unwrap();
    assert!(report.is_clean());
    assert_eq!(std::fs::read(tmp.path().join("a.bin")).unwrap(), b"binary");
    assert_eq!(
        std::fs::read(tmp.path().join("a.dirlock_tmp")).unwrap(),
        b"precious"
    );
}

#[test]
fn progress_counts_every_entry_up_to_total() {
    use std::sync::{Arc, Mutex};

    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "a.txt", b"alpha");
    write_file(tmp.path(), "b.txt", b"beta");
    write_file(tmp.path(), "c.txt", b"gamma");

    let seen: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: batch::ProgressFn =
        Box::new(move |done, total, _| sink.lock().unwrap().push((done, total)));

    batch::encrypt(tmp.path(), &password(), &[], Some(&progress)).unwrap();

    let calls = seen.lock().unwrap();
    assert_eq!(*calls, vec![(1, 3), (2, 3), (3, 3)]);
}
