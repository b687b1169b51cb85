use thiserror::Error;

/// Errors returned by history operations.
///
/// `Configuration`, `Validation` and `Precondition` are raised before any
/// store call, so they never leave a partial effect behind.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("document error: {0}")]
    Document(#[from] docline_types::TypeError),

    #[error("store error: {0}")]
    Store(#[from] docline_store::StoreError),

    #[error("diff error: {0}")]
    Diff(#[from] docline_diff::DiffError),

    #[error("merge error: {0}")]
    Merge(#[from] docline_merge::MergeError),
}

pub type HistoryResult<T> = Result<T, HistoryError>;
