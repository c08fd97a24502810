use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("failed to load expenses: {0}")]
    Fetch(#[source] tally_store::StoreError),

    #[error("store error: {0}")]
    Store(#[from] tally_store::StoreError),

    #[error("flow error: {0}")]
    Flow(#[from] tally_flow::FlowError),

    #[error("invalid input: {0}")]
    Input(#[from] tally_types::TypeError),

    #[error("preference error: {0}")]
    Preference(#[from] tally_store::PreferenceError),

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
