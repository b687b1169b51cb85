use async_trait::async_trait;
use docline_types::{DocumentKey, Map, Timestamp};

use crate::error::StoreResult;
use crate::patch::Patch;

/// Append-only persistence of patches keyed by document identity.
///
/// All implementations must satisfy these invariants:
/// - Patches are immutable once appended; only range deletion removes them.
/// - Every read returns patches sorted by timestamp ascending. Patches with
///   equal timestamps keep their insertion order.
/// - An append either stores the whole patch or fails; no partial records.
/// - Failures are returned, never retried or swallowed.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a patch. `timestamp = None` stamps it with the operation time.
    async fn append(
        &self,
        document: &DocumentKey,
        timestamp: Option<Timestamp>,
        diff: Option<Map>,
    ) -> StoreResult<Patch>;

    /// Patches with `timestamp <= max_timestamp`, oldest first.
    async fn query_range(
        &self,
        document: &DocumentKey,
        max_timestamp: Timestamp,
    ) -> StoreResult<Vec<Patch>>;

    /// Every patch for the document, oldest first.
    async fn query_all(&self, document: &DocumentKey) -> StoreResult<Vec<Patch>>;

    /// Delete patches with `timestamp <= max_timestamp`. Returns how many
    /// were removed.
    async fn delete_range(
        &self,
        document: &DocumentKey,
        max_timestamp: Timestamp,
    ) -> StoreResult<usize>;

    /// Number of patches held for the document.
    async fn count(&self, document: &DocumentKey) -> StoreResult<usize> {
        Ok(self.query_all(document).await?.len())
    }
}
