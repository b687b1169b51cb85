//! Version controller for docline.
//!
//! Records every change to a document as a timestamped patch and answers
//! point-in-time questions about it: what patches exist up to an instant,
//! what the document looked like then, and how to compact or reset that
//! history.
//!
//! The persistence layer drives recording through [`LifecycleHooks`];
//! applications query through [`HistoryController::for_document`].

pub mod action;
pub mod config;
pub mod controller;
pub mod error;
pub mod hooks;

pub use action::{ActionOutcome, HistoryAction};
pub use config::HistoryConfig;
pub use controller::{DocumentHistory, HistoryController};
pub use error::{HistoryError, HistoryResult};
pub use hooks::{LifecycleHooks, NoopHooks};

// Re-export the types callers need to drive the controller.
pub use docline_store::{HistoryRegistry, HistoryStore, InMemoryHistoryStore, JsonlHistoryStore, Patch};
pub use docline_types::{Clock, Document, DocumentKey, KeyType, ManualClock, Map, Schema, SystemClock, Timestamp, Value};
