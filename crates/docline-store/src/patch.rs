use std::fmt;

use docline_types::{DocumentKey, Map, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record identifier assigned by the store at append time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchId(Uuid);

impl PatchId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatchId({})", self.0)
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable history record for a document.
///
/// Persisted as `{ "_id", "document", "timestamp", "diff" }`. `diff` is a
/// sparse delta, a full snapshot, or `null` for a tombstone. Deltas and
/// snapshots share the same shape on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(rename = "_id")]
    pub id: PatchId,
    pub document: DocumentKey,
    pub timestamp: Timestamp,
    pub diff: Option<Map>,
}

impl Patch {
    pub fn new(document: DocumentKey, timestamp: Timestamp, diff: Option<Map>) -> Self {
        Self {
            id: PatchId::new(),
            document,
            timestamp,
            diff,
        }
    }

    /// Returns `true` if this patch marks the document as deleted.
    pub fn is_tombstone(&self) -> bool {
        self.diff.is_none()
    }
}
