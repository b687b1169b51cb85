use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use docline_types::{Clock, SystemClock};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreResult;
use crate::file::JsonlHistoryStore;
use crate::memory::InMemoryHistoryStore;
use crate::traits::HistoryStore;

/// Suffix appended to a model name to form its default history collection.
pub const HISTORY_SUFFIX: &str = "s_historical";

/// A connection able to open history collections by name.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn open(&self, collection: &str) -> StoreResult<Arc<dyn HistoryStore>>;
}

/// Backend that opens a fresh in-memory store per collection.
pub struct MemoryBackend {
    clock: Arc<dyn Clock>,
}

impl MemoryBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn open(&self, _collection: &str) -> StoreResult<Arc<dyn HistoryStore>> {
        Ok(Arc::new(InMemoryHistoryStore::with_clock(self.clock.clone())))
    }
}

/// Backend that keeps one `<collection>.jsonl` file per collection under `root`.
pub struct JsonlBackend {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonlBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, Arc::new(SystemClock))
    }

    pub fn with_clock(root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: root.into(),
            clock,
        }
    }
}

#[async_trait]
impl StoreBackend for JsonlBackend {
    async fn open(&self, collection: &str) -> StoreResult<Arc<dyn HistoryStore>> {
        let path = self.root.join(format!("{collection}.jsonl"));
        let store = JsonlHistoryStore::open_with_clock(path, self.clock.clone()).await?;
        Ok(Arc::new(store))
    }
}

/// Owned cache of history store handles, one per model.
///
/// Created at startup and handed to whoever builds history controllers;
/// [`HistoryRegistry::shutdown`] drops every cached handle.
pub struct HistoryRegistry {
    backend: Arc<dyn StoreBackend>,
    handles: Mutex<HashMap<String, Arc<dyn HistoryStore>>>,
}

impl HistoryRegistry {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// History collection name for a model: the override when given,
    /// otherwise `<model>s_historical`.
    pub fn collection_name(model: &str, collection_override: Option<&str>) -> String {
        match collection_override {
            Some(name) => name.to_string(),
            None => format!("{model}{HISTORY_SUFFIX}"),
        }
    }

    /// The store for `model`, opening it through the backend on first use.
    pub async fn store_for(
        &self,
        model: &str,
        collection_override: Option<&str>,
    ) -> StoreResult<Arc<dyn HistoryStore>> {
        let mut handles = self.handles.lock().await;
        if let Some(store) = handles.get(model) {
            return Ok(store.clone());
        }

        let collection = Self::collection_name(model, collection_override);
        let store = self.backend.open(&collection).await?;
        handles.insert(model.to_string(), store.clone());

        debug!(model, collection = %collection, "history store opened");
        Ok(store)
    }

    /// Pin an explicit store handle for `model`, bypassing the backend.
    pub async fn with_override(&self, model: &str, store: Arc<dyn HistoryStore>) {
        self.handles.lock().await.insert(model.to_string(), store);
    }

    /// Models with a cached handle, sorted.
    pub async fn models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.handles.lock().await.keys().cloned().collect();
        models.sort();
        models
    }

    /// Drop every cached handle.
    pub async fn shutdown(&self) {
        let mut handles = self.handles.lock().await;
        debug!(count = handles.len(), "history registry shut down");
        handles.clear();
    }
}
