use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value};
use tracing::{debug, warn};

use crate::dao::{
    models::{EntityKind, RemoteDocument, RemoteSnapshot},
    remote_store::RemoteStore,
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchRecordDocument, END_SUFFIX, RevisionOnly, UuidsResponse,
        collection_prefix, doc_id,
    },
};

/// CouchDB-backed [`RemoteStore`]; every collection shares one database and
/// is told apart by its `_id` prefix.
#[derive(Clone)]
pub struct CouchRemoteStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchRemoteStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.authorize(self.client.request(method, url))
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    async fn send(&self, builder: reqwest::RequestBuilder, path: &str) -> CouchResult<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.to_string(),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let url = self.database_url();
        let response = self
            .send(self.authorize(self.client.get(&url)), &url)
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(database = %self.database, "creating missing CouchDB database");
                let create = self
                    .send(self.authorize(self.client.put(&url)), &url)
                    .await?;
                // 412 means a concurrent client created it first.
                if create.status().is_success() || create.status() == StatusCode::PRECONDITION_FAILED {
                    Ok(())
                } else {
                    Err(CouchDaoError::RequestStatus {
                        path: url,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::RequestStatus {
                path: url,
                status: other,
            }),
        }
    }

    /// Ask the server for a fresh identifier.
    async fn next_uuid(&self) -> CouchResult<String> {
        const UUIDS: &str = "_uuids";
        let url = format!("{}/{}", self.base_url, UUIDS);
        let response = self
            .send(self.authorize(self.client.get(&url).query(&[("count", "1")])), UUIDS)
            .await?;
        let payload: UuidsResponse = decode(response, UUIDS).await?;
        payload.uuids.into_iter().next().ok_or(CouchDaoError::MissingUuid)
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::GET, doc_id), doc_id).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            _ => decode(response, doc_id).await.map(Some),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .send(self.request(Method::PUT, doc_id).json(document), doc_id)
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn delete_document(&self, doc_id: &str) -> CouchResult<()> {
        let Some(current) = self.get_document::<RevisionOnly>(doc_id).await? else {
            return Ok(());
        };
        let response = self
            .send(
                self.request(Method::DELETE, doc_id)
                    .query(&[("rev", current.rev.as_str())]),
                doc_id,
            )
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status,
            }),
        }
    }

    async fn list_documents(&self, kind: EntityKind) -> CouchResult<Vec<RemoteDocument>> {
        const ALL_DOCS: &str = "_all_docs";
        let prefix = collection_prefix(kind);
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .send(self.request(Method::GET, ALL_DOCS).query(&query), ALL_DOCS)
            .await?;
        let payload: AllDocsResponse = decode(response, ALL_DOCS).await?;

        let mut documents = Vec::with_capacity(payload.rows.len());
        for row in payload.rows {
            let Some(doc) = row.doc else { continue };
            match from_value::<CouchRecordDocument>(doc)
                .map_err(|err| err.to_string())
                .and_then(|doc| doc.into_remote(kind).map_err(|err| err.to_string()))
            {
                Ok(document) => documents.push(document),
                Err(error) => {
                    warn!(doc_id = %row.id, %error, "skipping malformed CouchDB document");
                }
            }
        }

        Ok(documents)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> CouchResult<T> {
    if !response.status().is_success() {
        return Err(CouchDaoError::RequestStatus {
            path: path.to_string(),
            status: response.status(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|source| CouchDaoError::DecodeResponse {
            path: path.to_string(),
            source,
        })
}

impl RemoteStore for CouchRemoteStore {
    fn create(
        &self,
        kind: EntityKind,
        last_modified: i64,
        body: Value,
    ) -> BoxFuture<'static, StorageResult<String>> {
        let store = self.clone();
        Box::pin(async move {
            let id = store.next_uuid().await?;
            let doc = CouchRecordDocument::new(
                kind,
                RemoteDocument {
                    id: id.clone(),
                    last_modified,
                    body,
                },
                None,
            );
            store.put_document(&doc.id, &doc).await?;
            Ok(id)
        })
    }

    fn fetch(
        &self,
        kind: EntityKind,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RemoteDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe_doc = store
                .get_document::<CouchRecordDocument>(&doc_id(kind, &id))
                .await?;
            match maybe_doc {
                Some(doc) => Ok(Some(doc.into_remote(kind)?)),
                None => Ok(None),
            }
        })
    }

    fn replace(
        &self,
        kind: EntityKind,
        document: RemoteDocument,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let path = doc_id(kind, &document.id);
            let rev = store
                .get_document::<RevisionOnly>(&path)
                .await?
                .map(|existing| existing.rev);
            let doc = CouchRecordDocument::new(kind, document, rev);
            store.put_document(&path, &doc).await.map_err(Into::into)
        })
    }

    fn delete(&self, kind: EntityKind, id: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_document(&doc_id(kind, &id))
                .await
                .map_err(Into::into)
        })
    }

    fn snapshot(&self, kind: EntityKind) -> BoxFuture<'static, StorageResult<RemoteSnapshot>> {
        let store = self.clone();
        Box::pin(async move {
            let documents = store.list_documents(kind).await?;
            Ok(RemoteSnapshot::live(documents))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .send(store.authorize(store.client.get(&url)), &url)
                .await?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
