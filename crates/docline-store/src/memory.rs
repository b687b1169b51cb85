use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use docline_types::{Clock, DocumentKey, Map, SystemClock, Timestamp};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::patch::Patch;
use crate::traits::HistoryStore;

/// In-memory history store for tests, local demos, and embedding.
pub struct InMemoryHistoryStore {
    clock: Arc<dyn Clock>,
    inner: RwLock<HashMap<DocumentKey, Vec<Patch>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Use `clock` to stamp appends that carry no explicit timestamp.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Documents that have at least one patch, in key order.
    pub fn documents(&self) -> StoreResult<Vec<DocumentKey>> {
        let streams = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut keys: Vec<_> = streams
            .iter()
            .filter(|(_, patches)| !patches.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let documents = self.inner.read().map(|s| s.len()).unwrap_or_default();
        f.debug_struct("InMemoryHistoryStore")
            .field("documents", &documents)
            .finish()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(
        &self,
        document: &DocumentKey,
        timestamp: Option<Timestamp>,
        diff: Option<Map>,
    ) -> StoreResult<Patch> {
        let timestamp = timestamp.unwrap_or_else(|| self.clock.now());
        let patch = Patch::new(document.clone(), timestamp, diff);

        let mut streams = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let stream = streams.entry(document.clone()).or_default();
        // Insert after every patch with an equal or earlier timestamp so that
        // the stream stays sorted and ties keep insertion order.
        let at = stream.partition_point(|p| p.timestamp <= timestamp);
        stream.insert(at, patch.clone());

        debug!(document = %document, timestamp = %timestamp, tombstone = patch.is_tombstone(), "patch appended");
        Ok(patch)
    }

    async fn query_range(
        &self,
        document: &DocumentKey,
        max_timestamp: Timestamp,
    ) -> StoreResult<Vec<Patch>> {
        let streams = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let Some(stream) = streams.get(document) else {
            return Ok(vec![]);
        };
        let end = stream.partition_point(|p| p.timestamp <= max_timestamp);
        Ok(stream[..end].to_vec())
    }

    async fn query_all(&self, document: &DocumentKey) -> StoreResult<Vec<Patch>> {
        let streams = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(streams.get(document).cloned().unwrap_or_default())
    }

    async fn delete_range(
        &self,
        document: &DocumentKey,
        max_timestamp: Timestamp,
    ) -> StoreResult<usize> {
        let mut streams = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let Some(stream) = streams.get_mut(document) else {
            return Ok(0);
        };
        let end = stream.partition_point(|p| p.timestamp <= max_timestamp);
        stream.drain(..end);
        if stream.is_empty() {
            streams.remove(document);
        }

        debug!(document = %document, removed = end, "patches deleted");
        Ok(end)
    }

    async fn count(&self, document: &DocumentKey) -> StoreResult<usize> {
        let streams = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(streams.get(document).map(Vec::len).unwrap_or(0))
    }
}
