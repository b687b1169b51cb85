use docline_types::TypeError;

/// Errors produced while reconstructing a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A declared schema path could not be laid out in the restore template.
    #[error("invalid template path: {0}")]
    Template(#[from] TypeError),
}

pub type MergeResult<T> = Result<T, MergeError>;
