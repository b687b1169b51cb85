use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use docline_types::{Clock, DocumentKey, Map, SystemClock, Timestamp};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::patch::Patch;
use crate::traits::HistoryStore;

/// History store backed by a JSON-lines file.
///
/// On-disk format: one serialized [`Patch`] per line, in append order.
/// Reads parse the whole file and sort by timestamp (stable, so equal
/// timestamps keep append order). Range deletes rewrite the file through a
/// temporary sibling and an atomic rename.
pub struct JsonlHistoryStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    // Serializes writers and keeps readers off half-written files.
    lock: Mutex<()>,
}

impl JsonlHistoryStore {
    /// Open (or create) the history file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        debug!(path = %path.display(), "history file opened");
        Ok(Self {
            path,
            clock,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<Vec<Patch>> {
        let text = fs::read_to_string(&self.path).await?;
        let mut patches = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let patch: Patch = serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                line: index + 1,
                reason: e.to_string(),
            })?;
            patches.push(patch);
        }
        Ok(patches)
    }

    /// Patches for `document`, oldest first. Decoded keys are matched by
    /// [`DocumentKey::same_identity`] and handed back as the caller's key.
    async fn load_document(&self, document: &DocumentKey) -> StoreResult<Vec<Patch>> {
        let mut patches: Vec<Patch> = self
            .load()
            .await?
            .into_iter()
            .filter(|p| p.document.same_identity(document))
            .map(|p| Patch {
                document: document.clone(),
                ..p
            })
            .collect();
        patches.sort_by_key(|p| p.timestamp);
        Ok(patches)
    }

    async fn rewrite(&self, patches: &[Patch]) -> StoreResult<()> {
        let mut body = String::new();
        for patch in patches {
            body.push_str(&encode(patch)?);
        }
        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn encode(patch: &Patch) -> StoreResult<String> {
    let mut line =
        serde_json::to_string(patch).map_err(|e| StoreError::Serialization(e.to_string()))?;
    line.push('\n');
    Ok(line)
}

impl std::fmt::Debug for JsonlHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlHistoryStore")
            .field("path", &self.path)
            .finish()
    }
}

#[async_trait]
impl HistoryStore for JsonlHistoryStore {
    async fn append(
        &self,
        document: &DocumentKey,
        timestamp: Option<Timestamp>,
        diff: Option<Map>,
    ) -> StoreResult<Patch> {
        let timestamp = timestamp.unwrap_or_else(|| self.clock.now());
        let patch = Patch::new(document.clone(), timestamp, diff);
        let line = encode(&patch)?;

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new().append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(document = %document, timestamp = %timestamp, "patch appended to file");
        Ok(patch)
    }

    async fn query_range(
        &self,
        document: &DocumentKey,
        max_timestamp: Timestamp,
    ) -> StoreResult<Vec<Patch>> {
        let _guard = self.lock.lock().await;
        let mut patches = self.load_document(document).await?;
        patches.retain(|p| p.timestamp <= max_timestamp);
        Ok(patches)
    }

    async fn query_all(&self, document: &DocumentKey) -> StoreResult<Vec<Patch>> {
        let _guard = self.lock.lock().await;
        self.load_document(document).await
    }

    async fn delete_range(
        &self,
        document: &DocumentKey,
        max_timestamp: Timestamp,
    ) -> StoreResult<usize> {
        let _guard = self.lock.lock().await;
        let patches = self.load().await?;
        let before = patches.len();
        let kept: Vec<Patch> = patches
            .into_iter()
            .filter(|p| !p.document.same_identity(document) || p.timestamp > max_timestamp)
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.rewrite(&kept).await?;
        }

        debug!(document = %document, removed, "patches deleted from file");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use docline_types::Value;

    fn diff(value: i64) -> Option<Map> {
        let mut map = Map::new();
        map.insert("n".into(), Value::Int(value));
        Some(map)
    }

    #[tokio::test]
    async fn patches_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history/posts_historical.jsonl");
        let doc = DocumentKey::Int(1);
        let t0 = Utc::now();

        {
            let store = JsonlHistoryStore::open(&path).await.unwrap();
            store.append(&doc, Some(t0 + Duration::seconds(1)), diff(1)).await.unwrap();
            store.append(&doc, Some(t0), diff(0)).await.unwrap();
            store.append(&doc, Some(t0 + Duration::seconds(2)), None).await.unwrap();
        }

        let store = JsonlHistoryStore::open(&path).await.unwrap();
        let all = store.query_all(&doc).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].diff, diff(0));
        assert_eq!(all[1].diff, diff(1));
        assert!(all[2].is_tombstone());
    }

    #[tokio::test]
    async fn delete_range_rewrites_only_matching_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlHistoryStore::open(dir.path().join("h.jsonl")).await.unwrap();
        let doc = DocumentKey::from("a");
        let other = DocumentKey::from("b");
        let t0 = Utc::now();

        store.append(&doc, Some(t0), diff(0)).await.unwrap();
        store.append(&other, Some(t0), diff(0)).await.unwrap();
        store.append(&doc, Some(t0 + Duration::seconds(5)), diff(1)).await.unwrap();

        assert_eq!(store.delete_range(&doc, t0).await.unwrap(), 1);
        assert_eq!(store.count(&doc).await.unwrap(), 1);
        assert_eq!(store.count(&other).await.unwrap(), 1);
        assert_eq!(store.query_range(&doc, t0).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn uuid_shaped_string_key_survives_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlHistoryStore::open(dir.path().join("h.jsonl")).await.unwrap();
        let doc = DocumentKey::String("0190b6c2-3f5e-7c1a-8b3d-1a2b3c4d5e6f".into());
        let t0 = Utc::now();

        store.append(&doc, Some(t0), diff(0)).await.unwrap();
        let all = store.query_all(&doc).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].document, doc);
        assert_eq!(store.count(&doc).await.unwrap(), 1);

        assert_eq!(store.delete_range(&doc, t0).await.unwrap(), 1);
        assert_eq!(store.count(&doc).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        let store = JsonlHistoryStore::open(&path).await.unwrap();
        store.append(&DocumentKey::Int(1), None, diff(1)).await.unwrap();
        tokio::fs::write(&path, "{not json}\n").await.unwrap();

        let err = store.query_all(&DocumentKey::Int(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 1, .. }));
    }
}
