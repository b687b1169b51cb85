use std::sync::Arc;

use docline_diff::{build_delta, build_full_delta, build_snapshot, expand_paths, update_paths, IgnoreSet};
use docline_merge::{reconstruct, template_from_schema, Reconstruction};
use docline_store::{HistoryRegistry, HistoryStore, Patch};
use docline_types::{Clock, Document, DocumentKey, Map, Schema, SystemClock, Timestamp};
use tracing::{debug, info};

use crate::action::{ActionOutcome, HistoryAction};
use crate::config::HistoryConfig;
use crate::error::{HistoryError, HistoryResult};

/// Records and reads back the history of one document model.
///
/// Owns the model's configuration, its schema-derived restore template and a
/// handle to its history store. Write-side entry points (`on_save`,
/// `on_update`, `on_delete`) are driven by the persistence layer; read-side
/// operations go through [`HistoryController::for_document`].
pub struct HistoryController {
    config: HistoryConfig,
    ignored: IgnoreSet,
    template: Map,
    store: Arc<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
}

impl HistoryController {
    /// Fails with [`HistoryError::Configuration`] if the primary key is not a
    /// declared schema field.
    pub fn new(
        config: HistoryConfig,
        schema: Schema,
        store: Arc<dyn HistoryStore>,
    ) -> HistoryResult<Self> {
        if !schema.contains(&config.primary_key_name) {
            return Err(HistoryError::Configuration(format!(
                "primary key `{}` is not declared in the schema",
                config.primary_key_name
            )));
        }

        let template = template_from_schema(&schema, &config.identity_fields())?;
        let ignored = config.ignored_paths.iter().cloned().collect();
        Ok(Self {
            config,
            ignored,
            template,
            store,
            clock: Arc::new(SystemClock),
        })
    }

    /// Build a controller whose store comes from `registry`, honouring the
    /// configured collection name.
    pub async fn from_registry(
        registry: &HistoryRegistry,
        model: &str,
        config: HistoryConfig,
        schema: Schema,
    ) -> HistoryResult<Self> {
        let store = registry
            .store_for(model, config.collection_name.as_deref())
            .await?;
        Self::new(config, schema, store)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Identity of `document` under the configured primary key.
    pub fn key_of(&self, document: &Document) -> HistoryResult<DocumentKey> {
        let name = &self.config.primary_key_name;
        let value = document.get(name).ok_or_else(|| {
            HistoryError::Configuration(format!("document has no primary key `{name}`"))
        })?;
        DocumentKey::from_value(value, self.config.primary_key_type)
            .map_err(|e| HistoryError::Configuration(format!("primary key `{name}`: {e}")))
    }

    /// Bind history operations to `document`'s identity and current state.
    pub fn for_document(&self, document: &Document) -> HistoryResult<DocumentHistory<'_>> {
        Ok(DocumentHistory {
            controller: self,
            key: self.key_of(document)?,
            document: document.clone(),
        })
    }

    /// Record the pending changes of `document` before it is persisted.
    ///
    /// A new document records a full-document delta. An existing one records
    /// only its modified paths; with nothing modified, nothing is appended.
    pub async fn on_save(&self, document: &Document) -> HistoryResult<Option<Patch>> {
        let key = self.key_of(document)?;
        let diff = if document.is_new() {
            build_full_delta(document.fields(), &self.config.identity_fields(), &self.ignored)
        } else {
            let touched = expand_paths(document.fields(), document.modified_paths());
            build_delta(document.fields(), &touched, &self.ignored)?
        };
        if diff.is_empty() && !document.is_new() {
            debug!(document = %key, "no recordable changes");
            return Ok(None);
        }
        self.append(&key, Some(diff)).await.map(Some)
    }

    /// Record a partial update that was applied to `document` directly in the
    /// store. `document` must hold the post-update state.
    pub async fn on_update(&self, document: &Document, update: &Map) -> HistoryResult<Option<Patch>> {
        let key = self.key_of(document)?;
        let touched = update_paths(update);
        let diff = build_delta(document.fields(), &touched, &self.ignored)?;
        if diff.is_empty() {
            debug!(document = %key, "update touched only ignored paths");
            return Ok(None);
        }
        self.append(&key, Some(diff)).await.map(Some)
    }

    /// [`HistoryController::on_update`] for every document matched by a
    /// multi-document update. Stops at the first failure.
    pub async fn on_update_many(&self, documents: &[Document], update: &Map) -> HistoryResult<Vec<Patch>> {
        let mut patches = Vec::with_capacity(documents.len());
        for document in documents {
            if let Some(patch) = self.on_update(document, update).await? {
                patches.push(patch);
            }
        }
        Ok(patches)
    }

    /// Record the deletion of `document` as a tombstone.
    pub async fn on_delete(&self, document: &Document) -> HistoryResult<Patch> {
        let key = self.key_of(document)?;
        self.append(&key, None).await
    }

    async fn append(&self, key: &DocumentKey, diff: Option<Map>) -> HistoryResult<Patch> {
        let at = self.clock.now();
        let patch = self.store.append(key, Some(at), diff).await?;
        debug!(document = %key, at = %at, tombstone = patch.is_tombstone(), "history recorded");
        Ok(patch)
    }

    fn validate_date(&self, at: Timestamp) -> HistoryResult<()> {
        let now = self.clock.now();
        if at > now {
            return Err(HistoryError::Validation(format!("{at} is in the future (now {now})")));
        }
        Ok(())
    }
}

impl std::fmt::Debug for HistoryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryController")
            .field("config", &self.config)
            .finish()
    }
}

/// History operations bound to one document.
///
/// Holds a copy of the document as it was when bound; rebind after the
/// document changes.
pub struct DocumentHistory<'a> {
    controller: &'a HistoryController,
    key: DocumentKey,
    document: Document,
}

impl DocumentHistory<'_> {
    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// Append a full copy of the document.
    ///
    /// Fails with [`HistoryError::Precondition`] while the document has
    /// changes that were never persisted.
    pub async fn snapshot(&self) -> HistoryResult<Patch> {
        self.ensure_clean()?;
        let diff = build_snapshot(self.document.fields(), &self.controller.config.identity_fields());
        self.controller.append(&self.key, Some(diff)).await
    }

    /// Patches recorded at or before `as_of`, oldest first.
    pub async fn details(&self, as_of: Timestamp) -> HistoryResult<Vec<Patch>> {
        self.controller.validate_date(as_of)?;
        let patches = self.controller.store.query_range(&self.key, as_of).await?;
        debug!(document = %self.key, as_of = %as_of, count = patches.len(), "history details");
        Ok(patches)
    }

    /// The document's state as of `as_of`.
    ///
    /// `None` when no history exists that early or the document was deleted
    /// by then.
    pub async fn restore(&self, as_of: Timestamp) -> HistoryResult<Option<Map>> {
        let patches = self.details(as_of).await?;
        let controller = self.controller;
        let outcome = reconstruct(
            &patches,
            as_of,
            Some(&controller.template),
            &controller.config.identity_fields(),
        );
        if let Reconstruction::Deleted { at } = &outcome {
            debug!(document = %self.key, deleted_at = %at, "restore hit a tombstone");
        }
        Ok(outcome.into_value())
    }

    /// Restore and write the result into `document`, marking the restored
    /// fields modified so the next save persists them.
    ///
    /// Returns `false` when there was nothing to restore.
    pub async fn restore_into(&self, document: &mut Document, as_of: Timestamp) -> HistoryResult<bool> {
        if self.controller.key_of(document)? != self.key {
            return Err(HistoryError::Validation(format!(
                "document is not bound to history of {}",
                self.key
            )));
        }
        let Some(restored) = self.restore(as_of).await? else {
            return Ok(false);
        };
        document.apply_restored(restored)?;
        Ok(true)
    }

    /// Collapse every patch at or before `as_of` into one patch at `as_of`
    /// holding the restored state. A no-op when nothing restores.
    pub async fn trim(&self, as_of: Timestamp) -> HistoryResult<Option<Patch>> {
        let Some(restored) = self.restore(as_of).await? else {
            debug!(document = %self.key, as_of = %as_of, "nothing to trim");
            return Ok(None);
        };

        let store = &self.controller.store;
        let removed = store.delete_range(&self.key, as_of).await?;
        let patch = store.append(&self.key, Some(as_of), Some(restored)).await?;

        info!(document = %self.key, as_of = %as_of, removed, "history trimmed");
        Ok(Some(patch))
    }

    /// Drop the whole history and start over from a fresh snapshot.
    ///
    /// The snapshot precondition is checked first, so a document with
    /// unsaved changes keeps its history.
    pub async fn clear(&self) -> HistoryResult<Patch> {
        self.ensure_clean()?;

        let store = &self.controller.store;
        let existing = store.query_all(&self.key).await?;
        let mut removed = 0;
        if let Some(latest) = existing.iter().map(|p| p.timestamp).max() {
            removed = store.delete_range(&self.key, latest).await?;
        }
        let patch = self.snapshot().await?;

        info!(document = %self.key, removed, "history cleared");
        Ok(patch)
    }

    /// Run one named action; dated actions without a date use "now".
    pub async fn run(&self, action: HistoryAction) -> HistoryResult<ActionOutcome> {
        let now = || self.controller.clock.now();
        debug!(document = %self.key, action = action.name(), "running history action");
        Ok(match action {
            HistoryAction::Snapshot => ActionOutcome::Snapshot(self.snapshot().await?),
            HistoryAction::Clear => ActionOutcome::Cleared(self.clear().await?),
            HistoryAction::Restore(at) => {
                ActionOutcome::Restored(self.restore(at.unwrap_or_else(now)).await?)
            }
            HistoryAction::Trim(at) => ActionOutcome::Trimmed(self.trim(at.unwrap_or_else(now)).await?),
            HistoryAction::Details(at) => {
                ActionOutcome::Details(self.details(at.unwrap_or_else(now)).await?)
            }
        })
    }

    fn ensure_clean(&self) -> HistoryResult<()> {
        if self.document.is_dirty() {
            return Err(HistoryError::Precondition(format!(
                "document {} has unsaved changes",
                self.key
            )));
        }
        Ok(())
    }
}
