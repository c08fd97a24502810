use std::path::PathBuf;

/// Errors from expense store operations.
///
/// Cloneable so that a failed add can be carried as data on a
/// `Resource::Rejected` and fanned out to several observers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the record.
    #[error("add rejected: {0}")]
    Rejected(String),

    /// The store could not be reached or is shut down.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the data file failed.
    #[error("persistence error at {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    /// The data file exists but does not contain a valid record list.
    #[error("corrupt data file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl StoreError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from preference (key-value) store operations.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
