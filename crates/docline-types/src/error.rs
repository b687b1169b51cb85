use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("path `{path}` is blocked by a scalar value at `{at}`")]
    PathConflict { path: String, at: String },

    #[error("array index {index} in `{path}` is past the end of an array of length {len}")]
    IndexOutOfRange { path: String, index: String, len: usize },

    #[error("empty path")]
    EmptyPath,

    #[error("key type mismatch: expected {expected}, got {actual}")]
    KeyTypeMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}
