/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process backend.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::{env, sync::Arc};

use futures::future::BoxFuture;
use serde_json::Value;

use crate::dao::{
    models::{EntityKind, RemoteDocument, RemoteSnapshot},
    storage::{StorageError, StorageErrorKind, StorageResult},
};

pub use memory::MemoryRemoteStore;

/// Remote authoritative collections, one per [`EntityKind`].
///
/// Every call is a single attempt; timeouts and retries are layered on top by
/// the caller.
pub trait RemoteStore: Send + Sync {
    /// Create a document and return the identifier assigned by the remote.
    fn create(
        &self,
        kind: EntityKind,
        last_modified: i64,
        body: Value,
    ) -> BoxFuture<'static, StorageResult<String>>;
    /// Read one document.
    fn fetch(
        &self,
        kind: EntityKind,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RemoteDocument>>>;
    /// Overwrite (or recreate) the document with `document.id`.
    fn replace(
        &self,
        kind: EntityKind,
        document: RemoteDocument,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a document. Deleting a missing document succeeds.
    fn delete(&self, kind: EntityKind, id: String) -> BoxFuture<'static, StorageResult<()>>;
    /// Read every document of the collection.
    fn snapshot(&self, kind: EntityKind) -> BoxFuture<'static, StorageResult<RemoteSnapshot>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Environment variable selecting the remote backend.
const BACKEND_ENV: &str = "STORAGE_BACKEND";

/// Remote backend chosen at startup.
#[derive(Clone)]
pub enum StorageBackend {
    /// CouchDB over HTTP.
    #[cfg(feature = "couch-store")]
    Couch(couchdb::CouchConfig),
    /// MongoDB through the official driver.
    #[cfg(feature = "mongo-store")]
    Mongo(mongodb::MongoConfig),
    /// In-process store.
    Memory(MemoryRemoteStore),
}

impl StorageBackend {
    /// Resolve the backend from `STORAGE_BACKEND` (`couch`, `mongo` or `memory`).
    ///
    /// Defaults to CouchDB when compiled in, MongoDB otherwise, and finally the
    /// in-process memory store.
    pub async fn from_env() -> StorageResult<Self> {
        let requested = env::var(BACKEND_ENV)
            .ok()
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty());

        match requested.as_deref() {
            #[cfg(feature = "couch-store")]
            Some("couch" | "couchdb") | None => {
                let config = couchdb::CouchConfig::from_env()?;
                Ok(StorageBackend::Couch(config))
            }
            #[cfg(feature = "mongo-store")]
            Some("mongo" | "mongodb") => {
                let config = mongodb::MongoConfig::from_env().await?;
                Ok(StorageBackend::Mongo(config))
            }
            #[cfg(all(feature = "mongo-store", not(feature = "couch-store")))]
            None => {
                let config = mongodb::MongoConfig::from_env().await?;
                Ok(StorageBackend::Mongo(config))
            }
            #[cfg(not(any(feature = "couch-store", feature = "mongo-store")))]
            None => Ok(StorageBackend::Memory(MemoryRemoteStore::new())),
            Some("memory") => Ok(StorageBackend::Memory(MemoryRemoteStore::new())),
            Some(other) => Err(StorageError::new(
                StorageErrorKind::Misconfigured,
                format!("unsupported {BACKEND_ENV} value `{other}`"),
            )),
        }
    }

    /// Human-readable backend name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "couch-store")]
            StorageBackend::Couch(_) => "couchdb",
            #[cfg(feature = "mongo-store")]
            StorageBackend::Mongo(_) => "mongodb",
            StorageBackend::Memory(_) => "memory",
        }
    }

    /// Open a connection to the backend.
    pub fn connect(&self) -> BoxFuture<'static, StorageResult<Arc<dyn RemoteStore>>> {
        let backend = self.clone();
        Box::pin(async move {
            match backend {
                #[cfg(feature = "couch-store")]
                StorageBackend::Couch(config) => {
                    let store = couchdb::CouchRemoteStore::connect(config).await?;
                    Ok(Arc::new(store) as Arc<dyn RemoteStore>)
                }
                #[cfg(feature = "mongo-store")]
                StorageBackend::Mongo(config) => {
                    let store = mongodb::MongoRemoteStore::connect(config).await?;
                    Ok(Arc::new(store) as Arc<dyn RemoteStore>)
                }
                StorageBackend::Memory(store) => Ok(Arc::new(store) as Arc<dyn RemoteStore>),
            }
        })
    }
}
