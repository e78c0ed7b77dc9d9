use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{doc, oid::ObjectId},
};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::MongoRecordDocument,
};
use crate::dao::{
    models::{EntityKind, RemoteDocument, RemoteSnapshot},
    remote_store::RemoteStore,
    storage::StorageResult,
};

/// MongoDB-backed [`RemoteStore`] with one collection per entity kind.
#[derive(Clone)]
pub struct MongoRemoteStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoRemoteStore {
    /// Connect and ping the configured database.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        Ok(Self {
            inner: Arc::new(MongoInner {
                state: RwLock::new(MongoState { client, database }),
                config,
            }),
        })
    }

    async fn collection(&self, kind: EntityKind) -> Collection<MongoRecordDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoRecordDocument>(kind.collection())
    }

    async fn create(&self, kind: EntityKind, last_modified: i64, body: Value) -> MongoResult<String> {
        let id = ObjectId::new().to_hex();
        let document = MongoRecordDocument {
            id: id.clone(),
            last_modified,
            body,
        };
        self.collection(kind)
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Create {
                collection: kind.collection(),
                source,
            })?;
        Ok(id)
    }

    async fn fetch(&self, kind: EntityKind, id: String) -> MongoResult<Option<RemoteDocument>> {
        let document = self
            .collection(kind)
            .await
            .find_one(doc! { "_id": id.as_str() })
            .await
            .map_err(|source| MongoDaoError::Fetch {
                collection: kind.collection(),
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn replace(&self, kind: EntityKind, document: RemoteDocument) -> MongoResult<()> {
        let document = MongoRecordDocument::from(document);
        self.collection(kind)
            .await
            .replace_one(doc! { "_id": document.id.as_str() }, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Replace {
                collection: kind.collection(),
                id: document.id.clone(),
                source,
            })?;
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: String) -> MongoResult<()> {
        self.collection(kind)
            .await
            .delete_one(doc! { "_id": id.as_str() })
            .await
            .map_err(|source| MongoDaoError::Delete {
                collection: kind.collection(),
                id,
                source,
            })?;
        Ok(())
    }

    async fn snapshot(&self, kind: EntityKind) -> MongoResult<RemoteSnapshot> {
        let snapshot_err = |source| MongoDaoError::Snapshot {
            collection: kind.collection(),
            source,
        };
        let documents: Vec<MongoRecordDocument> = self
            .collection(kind)
            .await
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(snapshot_err)?
            .try_collect()
            .await
            .map_err(snapshot_err)?;

        Ok(RemoteSnapshot::live(
            documents.into_iter().map(Into::into).collect(),
        ))
    }
}

impl RemoteStore for MongoRemoteStore {
    fn create(
        &self,
        kind: EntityKind,
        last_modified: i64,
        body: Value,
    ) -> BoxFuture<'static, StorageResult<String>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .create(kind, last_modified, body)
                .await
                .map_err(Into::into)
        })
    }

    fn fetch(
        &self,
        kind: EntityKind,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RemoteDocument>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch(kind, id).await.map_err(Into::into) })
    }

    fn replace(
        &self,
        kind: EntityKind,
        document: RemoteDocument,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace(kind, document).await.map_err(Into::into) })
    }

    fn delete(&self, kind: EntityKind, id: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete(kind, id).await.map_err(Into::into) })
    }

    fn snapshot(&self, kind: EntityKind) -> BoxFuture<'static, StorageResult<RemoteSnapshot>> {
        let store = self.clone();
        Box::pin(async move { store.snapshot(kind).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
