use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{EntityKind, RemoteDocument};

use super::error::{CouchDaoError, CouchResult};

/// Upper bound appended to a prefix to build an `_all_docs` key range.
pub const END_SUFFIX: &str = "\u{ffff}";

/// Body of `GET /{db}/_all_docs`.
#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    /// One row per document in the key range.
    pub rows: Vec<AllDocsRow>,
}

/// Row of an `_all_docs` listing.
#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    /// Full document id, prefix included.
    pub id: String,
    /// Document body when `include_docs` was set.
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Body of `GET /_uuids`.
#[derive(Debug, Deserialize)]
pub struct UuidsResponse {
    /// Server-generated ids.
    pub uuids: Vec<String>,
}

/// Record document as stored in CouchDB: `{collection}::{id}` plus revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRecordDocument {
    /// Full document id, prefix included.
    #[serde(rename = "_id")]
    pub id: String,
    /// Current revision; absent on first write.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Modification time carried with the document.
    pub last_modified: i64,
    /// Entity payload.
    pub body: Value,
}

impl CouchRecordDocument {
    /// Wrap `document` for storage under its prefixed id.
    pub fn new(kind: EntityKind, document: RemoteDocument, rev: Option<String>) -> Self {
        Self {
            id: doc_id(kind, &document.id),
            rev,
            last_modified: document.last_modified,
            body: document.body,
        }
    }

    /// Strip the prefix and CouchDB metadata.
    pub fn into_remote(self, kind: EntityKind) -> CouchResult<RemoteDocument> {
        let id = record_id(kind, &self.id)?.to_string();
        Ok(RemoteDocument {
            id,
            last_modified: self.last_modified,
            body: self.body,
        })
    }
}

/// Minimal projection used when only the revision is needed.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    /// New revision of the written document.
    #[serde(rename = "_rev")]
    pub rev: String,
}

/// Id prefix shared by every document of `kind`.
pub fn collection_prefix(kind: EntityKind) -> String {
    format!("{}::", kind.collection())
}

/// Prefixed document id of `id` in `kind`.
pub fn doc_id(kind: EntityKind, id: &str) -> String {
    format!("{}{}", collection_prefix(kind), id)
}

/// Strip the collection prefix from a CouchDB `_id`.
pub fn record_id(kind: EntityKind, doc_id: &str) -> CouchResult<&str> {
    doc_id
        .strip_prefix(&collection_prefix(kind))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            collection: kind.collection(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn doc_ids_are_prefixed_per_collection() {
        assert_eq!(doc_id(EntityKind::Players, "abc"), "players::abc");
        assert_eq!(
            record_id(EntityKind::Players, "players::abc").unwrap(),
            "abc"
        );
        assert!(record_id(EntityKind::Schedules, "players::abc").is_err());
        assert!(record_id(EntityKind::Players, "players::").is_err());
    }

    #[test]
    fn new_documents_skip_revision() {
        let document = CouchRecordDocument::new(
            EntityKind::TeamConfigs,
            RemoteDocument {
                id: "cfg".into(),
                last_modified: 42,
                body: json!({ "name": "Mix" }),
            },
            None,
        );
        let encoded = serde_json::to_value(&document).unwrap();
        assert_eq!(encoded["_id"], "team_configs::cfg");
        assert!(encoded.get("_rev").is_none());
        assert_eq!(encoded["last_modified"], 42);
    }

    #[test]
    fn stored_documents_decode_back_to_remote_documents() {
        let stored: CouchRecordDocument = serde_json::from_value(json!({
            "_id": "schedules::s1",
            "_rev": "3-abc",
            "last_modified": 7,
            "body": { "title": "Cup" }
        }))
        .unwrap();
        let remote = stored.into_remote(EntityKind::Schedules).unwrap();
        assert_eq!(remote.id, "s1");
        assert_eq!(remote.last_modified, 7);
        assert_eq!(remote.body["title"], "Cup");
    }
}
