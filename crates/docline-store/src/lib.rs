//! Append-only patch history for docline.
//!
//! This crate owns the persisted record shape and the storage boundary the
//! version controller talks to. It provides:
//! - [`Patch`] records (`{ _id, document, timestamp, diff }`)
//! - The [`HistoryStore`] async trait boundary
//! - [`InMemoryHistoryStore`] for tests and embedding
//! - [`JsonlHistoryStore`], a JSON-lines file backend
//! - [`HistoryRegistry`], an owned cache of one store handle per model
//!
//! # Ordering
//!
//! Every read is sorted by timestamp ascending. Patches sharing a timestamp
//! come back in the order they were appended.

pub mod error;
pub mod file;
pub mod memory;
pub mod patch;
pub mod registry;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonlHistoryStore;
pub use memory::InMemoryHistoryStore;
pub use patch::{Patch, PatchId};
pub use registry::{HistoryRegistry, JsonlBackend, MemoryBackend, StoreBackend};
pub use traits::HistoryStore;
