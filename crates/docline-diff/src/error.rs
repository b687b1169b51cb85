//! Error types for the diff crate.

use docline_types::TypeError;

/// Errors that can occur while building a patch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A touched path could not be written into the patch tree.
    #[error("cannot write patch path: {0}")]
    Path(#[from] TypeError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
