use serde::{Deserialize, Serialize};

/// State of a directory with respect to the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryState {
    /// No config file present; nothing has been encrypted
    Uninitialized,
    /// Config file present; entries are (or are being) transformed
    Encrypted,
}

/// A single failed entry inside a batch, with a human-readable reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of a batch encrypt/decrypt over one directory.
///
/// Entries land in exactly one bucket: transformed successfully, skipped
/// because they were on the ignore list, or failed (recorded and, on encrypt,
/// appended to the persisted ignore list).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<EntryFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }

    /// True when every processed entry succeeded (skips are fine).
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn record_success(&mut self, name: impl Into<String>) {
        self.succeeded.push(name.into());
    }

    pub fn record_skip(&mut self, name: impl Into<String>) {
        self.skipped.push(name.into());
    }

    pub fn record_failure(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(EntryFailure {
            name: name.into(),
            reason: reason.into(),
        });
    }
}
