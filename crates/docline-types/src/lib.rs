//! Foundation types for docline.
//!
//! This crate provides the value, path, identity, and temporal types used
//! throughout docline. Every other docline crate depends on `docline-types`.
//!
//! # Key Types
//!
//! - [`Value`] / [`Map`] -- Schema-flexible document tree
//! - [`get_at_path`] / [`set_at_path`] / [`resolve_path`] -- Dotted-path addressing
//! - [`DocumentKey`] / [`KeyType`] -- Primary-key identity of a versioned document
//! - [`Schema`] -- Declared field paths of a document type
//! - [`Document`] -- Live document with dirty tracking
//! - [`Clock`] -- Source of "now" ([`SystemClock`], [`ManualClock`])

pub mod document;
pub mod error;
pub mod key;
pub mod path;
pub mod schema;
pub mod temporal;
pub mod value;

pub use document::Document;
pub use error::TypeError;
pub use key::{DocumentKey, KeyType};
pub use path::{get_at_path, is_within, remove_at_path, resolve_path, set_at_path, Resolved};
pub use schema::Schema;
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
pub use value::{Map, Value};
