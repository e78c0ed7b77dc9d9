use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::RemoteDocument;

/// One record as stored in its per-kind collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRecordDocument {
    /// ObjectId hex string.
    #[serde(rename = "_id")]
    pub id: String,
    /// Modification time carried with the document.
    pub last_modified: i64,
    /// Entity payload.
    pub body: Value,
}

impl From<RemoteDocument> for MongoRecordDocument {
    fn from(value: RemoteDocument) -> Self {
        Self {
            id: value.id,
            last_modified: value.last_modified,
            body: value.body,
        }
    }
}

impl From<MongoRecordDocument> for RemoteDocument {
    fn from(value: MongoRecordDocument) -> Self {
        Self {
            id: value.id,
            last_modified: value.last_modified,
            body: value.body,
        }
    }
}
