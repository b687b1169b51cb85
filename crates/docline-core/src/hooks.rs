use async_trait::async_trait;
use docline_types::{Document, Map};

use crate::controller::HistoryController;
use crate::error::HistoryResult;

/// Entry points the persistence layer calls around document mutations.
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    /// Before a create or a full save.
    async fn before_save(&self, document: &Document) -> HistoryResult<()>;
    /// After a single-document partial update; `document` is the new state.
    async fn after_update(&self, document: &Document, update: &Map) -> HistoryResult<()>;
    /// After a partial update that matched several documents.
    async fn after_update_many(&self, documents: &[Document], update: &Map) -> HistoryResult<()>;
    async fn before_delete(&self, document: &Document) -> HistoryResult<()>;
}

#[async_trait]
impl LifecycleHooks for HistoryController {
    async fn before_save(&self, document: &Document) -> HistoryResult<()> {
        self.on_save(document).await.map(drop)
    }

    async fn after_update(&self, document: &Document, update: &Map) -> HistoryResult<()> {
        self.on_update(document, update).await.map(drop)
    }

    async fn after_update_many(&self, documents: &[Document], update: &Map) -> HistoryResult<()> {
        self.on_update_many(documents, update).await.map(drop)
    }

    async fn before_delete(&self, document: &Document) -> HistoryResult<()> {
        self.on_delete(document).await.map(drop)
    }
}

/// Hooks for models without history.
pub struct NoopHooks;

#[async_trait]
impl LifecycleHooks for NoopHooks {
    async fn before_save(&self, _document: &Document) -> HistoryResult<()> {
        Ok(())
    }

    async fn after_update(&self, _document: &Document, _update: &Map) -> HistoryResult<()> {
        Ok(())
    }

    async fn after_update_many(&self, _documents: &[Document], _update: &Map) -> HistoryResult<()> {
        Ok(())
    }

    async fn before_delete(&self, _document: &Document) -> HistoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use docline_store::{HistoryStore, InMemoryHistoryStore};
    use docline_types::{DocumentKey, Schema, Value};

    use crate::config::HistoryConfig;
    use crate::HistoryAction;

    fn doc(id: &str, name: &str) -> Document {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::from(id));
        fields.insert("name".into(), Value::from(name));
        Document::from_persisted(fields)
    }

    fn controller(store: Arc<InMemoryHistoryStore>) -> HistoryController {
        let config = HistoryConfig {
            primary_key_type: docline_types::KeyType::String,
            ..HistoryConfig::default()
        };
        HistoryController::new(config, Schema::new(["id", "name"]), store).unwrap()
    }

    #[tokio::test]
    async fn controller_hooks_record_history() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let hooks: Arc<dyn LifecycleHooks> = Arc::new(controller(store.clone()));

        let mut update = Map::new();
        let mut set = Map::new();
        set.insert("name".into(), Value::from("b"));
        update.insert("$set".into(), Value::Object(set));

        let docs = vec![doc("a", "b"), doc("c", "b")];
        hooks.after_update_many(&docs, &update).await.unwrap();
        hooks.before_delete(&docs[0]).await.unwrap();

        let a = store.query_all(&DocumentKey::from("a")).await.unwrap();
        assert_eq!(a.len(), 2);
        assert!(a[1].is_tombstone());
        assert_eq!(store.count(&DocumentKey::from("c")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn noop_hooks_record_nothing() {
        let hooks = NoopHooks;
        let d = doc("a", "x");
        hooks.before_save(&d).await.unwrap();
        hooks.after_update(&d, &Map::new()).await.unwrap();
        hooks.after_update_many(&[d.clone()], &Map::new()).await.unwrap();
        hooks.before_delete(&d).await.unwrap();
    }

    #[tokio::test]
    async fn dispatch_after_hooks() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let controller = controller(store);
        let d = doc("a", "x");
        controller.before_delete(&d).await.unwrap();

        let history = controller.for_document(&d).unwrap();
        let outcome = history.run(HistoryAction::Restore(None)).await.unwrap();
        assert_eq!(outcome, crate::ActionOutcome::Restored(None));
    }
}
