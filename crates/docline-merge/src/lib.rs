//! Merge engine for docline.
//!
//! Folds an ordered sequence of patches into a single reconstructed
//! document: objects deep-merge, arrays replace outright, and a tombstone
//! ends the fold as "deleted".

pub mod error;
pub mod merge;
pub mod reconstruct;

pub use error::{MergeError, MergeResult};
pub use merge::deep_merge;
pub use reconstruct::{reconstruct, template_from_schema, Reconstruction};
