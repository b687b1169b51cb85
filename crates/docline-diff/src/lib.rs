//! Diff engine for docline.
//!
//! Reduces a document mutation to a minimal, path-keyed patch.
//!
//! # Key Items
//!
//! - [`flatten_paths`] / [`update_paths`] / [`expand_paths`] -- Path flattener
//! - [`build_delta`] -- Sparse delta patch for a set of touched paths
//! - [`build_full_delta`] -- Delta patch for a newly created document
//! - [`build_snapshot`] -- Full-copy snapshot patch (not ignore-filtered)
//! - [`IgnoreSet`] -- Dotted paths excluded from delta patches

pub mod delta;
pub mod error;
pub mod flatten;
pub mod ignore;

pub use delta::{build_delta, build_full_delta, build_snapshot};
pub use error::{DiffError, DiffResult};
pub use flatten::{dedup_paths, expand_paths, flatten_paths, is_flattenable, update_paths};
pub use ignore::IgnoreSet;
