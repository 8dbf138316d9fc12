use thiserror::Error;

pub type DirlockResult<T> = Result<T, DirlockError>;

/// Error taxonomy for the vault.
///
/// `Validation`, `ConfigFormat` and `PasswordMismatch` are fail-fast: they are
/// raised before any entry is mutated. `Entry` wraps a failure that is scoped
/// to a single file inside a batch; the batch layer records it and continues.
#[derive(Debug, Error)]
pub enum DirlockError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("config format error: {0}")]
    ConfigFormat(String),

    #[error("password does not match the stored digest")]
    PasswordMismatch,

    #[error("transport decode error: {0}")]
    Encoding(String),

    #[error("entry '{name}' failed: {source}")]
    Entry {
        name: String,
        #[source]
        source: Box<DirlockError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DirlockError {
    /// Wrap an error as a per-entry failure for the named file.
    pub fn for_entry(name: impl Into<String>, source: DirlockError) -> Self {
        DirlockError::Entry {
            name: name.into(),
            source: Box::new(source),
        }
    }

}
