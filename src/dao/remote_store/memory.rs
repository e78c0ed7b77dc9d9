//! In-process remote store used for local runs and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;
use uuid::Uuid;

use crate::dao::{
    models::{EntityKind, RemoteDocument, RemoteSnapshot},
    remote_store::RemoteStore,
    storage::StorageResult,
};

/// [`RemoteStore`] keeping every collection in a shared concurrent map.
///
/// Clones share the same data, so a store handed to the supervisor and one
/// kept by a test observe the same documents.
#[derive(Clone, Default)]
pub struct MemoryRemoteStore {
    documents: Arc<DashMap<(EntityKind, String), RemoteDocument>>,
}

impl MemoryRemoteStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents of one collection, sorted by identifier.
    pub fn documents(&self, kind: EntityKind) -> Vec<RemoteDocument> {
        let mut documents: Vec<RemoteDocument> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        documents
    }

    /// Document `id` of `kind`, if present.
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<RemoteDocument> {
        self.documents
            .get(&(kind, id.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Insert or overwrite a document directly, bypassing the trait.
    pub fn put(&self, kind: EntityKind, document: RemoteDocument) {
        self.documents
            .insert((kind, document.id.clone()), document);
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn create(
        &self,
        kind: EntityKind,
        last_modified: i64,
        body: Value,
    ) -> BoxFuture<'static, StorageResult<String>> {
        let store = self.clone();
        Box::pin(async move {
            let id = Uuid::new_v4().simple().to_string();
            store.put(
                kind,
                RemoteDocument {
                    id: id.clone(),
                    last_modified,
                    body,
                },
            );
            Ok(id)
        })
    }

    fn fetch(
        &self,
        kind: EntityKind,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RemoteDocument>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.get(kind, &id)) })
    }

    fn replace(
        &self,
        kind: EntityKind,
        document: RemoteDocument,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.put(kind, document);
            Ok(())
        })
    }

    fn delete(&self, kind: EntityKind, id: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.documents.remove(&(kind, id));
            Ok(())
        })
    }

    fn snapshot(&self, kind: EntityKind) -> BoxFuture<'static, StorageResult<RemoteSnapshot>> {
        let store = self.clone();
        Box::pin(async move { Ok(RemoteSnapshot::live(store.documents(kind))) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let store = MemoryRemoteStore::new();
        let first = store
            .create(EntityKind::Players, 10, json!({ "name": "Ana" }))
            .await
            .unwrap();
        let second = store
            .create(EntityKind::Players, 11, json!({ "name": "Bea" }))
            .await
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(store.documents(EntityKind::Players).len(), 2);
        assert!(store.documents(EntityKind::Schedules).is_empty());
    }

    #[tokio::test]
    async fn delete_of_missing_document_succeeds() {
        let store = MemoryRemoteStore::new();
        store
            .delete(EntityKind::Schedules, "nope".into())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn snapshot_is_live_and_scoped_to_kind() {
        let store = MemoryRemoteStore::new();
        let id = store
            .create(EntityKind::TeamConfigs, 5, json!({ "name": "Mix", "team_size": 6 }))
            .await
            .unwrap();
        let snapshot = store.snapshot(EntityKind::TeamConfigs).await.unwrap();
        assert!(!snapshot.from_cache);
        assert_eq!(snapshot.documents.len(), 1);
        assert_eq!(snapshot.documents[0].id, id);
        assert_eq!(snapshot.documents[0].last_modified, 5);
    }
}
