pub mod error;
pub mod types;

pub use error::{DirlockError, DirlockResult};
pub use types::{BatchReport, DirectoryState, EntryFailure};
