use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::Record,
    dto::format_timestamp_ms,
    error::SyncError,
    state::{PushOutcome, RemoteDeletion},
};

/// Outcome of the remote half of a write. The local half always succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    /// Saved locally; pushed on the next reconnect sweep.
    Offline { message: String },
    /// The remote copy is newer and was kept.
    RemoteNewer { message: String },
    Failed { message: String },
}

impl SyncStatus {
    pub fn from_push(result: Result<PushOutcome, SyncError>) -> Self {
        match result {
            Ok(PushOutcome::Created { .. } | PushOutcome::Updated) => SyncStatus::Synced,
            Ok(PushOutcome::RemoteNewer { .. }) => SyncStatus::RemoteNewer {
                message: "A newer version exists on the server; it was kept.".into(),
            },
            Err(err) => Self::from_error(&err),
        }
    }

    pub fn from_deletion(result: &Result<RemoteDeletion, SyncError>) -> Self {
        match result {
            Ok(RemoteDeletion::NotNeeded | RemoteDeletion::Deleted) => SyncStatus::Synced,
            Ok(RemoteDeletion::Skipped) => SyncStatus::Offline {
                message: "Deleted on this device; the server copy was left in place.".into(),
            },
            Err(err) => Self::from_error(err),
        }
    }

    fn from_error(err: &SyncError) -> Self {
        match err {
            SyncError::Offline => SyncStatus::Offline {
                message: err.user_message(),
            },
            other => SyncStatus::Failed {
                message: other.user_message(),
            },
        }
    }
}

/// Bookkeeping fields shared by every record projection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordMeta {
    pub local_id: Uuid,
    /// Remote identifier, absent until the record reached the server.
    pub id: Option<String>,
    pub last_modified: i64,
    /// `last_modified` as RFC 3339.
    pub modified_at: String,
}

impl<T> From<&Record<T>> for RecordMeta {
    fn from(record: &Record<T>) -> Self {
        Self {
            local_id: record.local_id,
            id: record.id.clone(),
            last_modified: record.last_modified,
            modified_at: format_timestamp_ms(record.last_modified),
        }
    }
}

/// Acknowledgement returned by delete endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub local_id: Uuid,
    pub sync: SyncStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::storage::StorageError;

    #[test]
    fn push_results_map_to_statuses() {
        assert_eq!(
            SyncStatus::from_push(Ok(PushOutcome::Updated)),
            SyncStatus::Synced
        );
        assert!(matches!(
            SyncStatus::from_push(Err(SyncError::Offline)),
            SyncStatus::Offline { .. }
        ));
        let denied = SyncError::from(StorageError::permission_denied("nope"));
        assert!(matches!(
            SyncStatus::from_push(Err(denied)),
            SyncStatus::Failed { .. }
        ));
    }

    #[test]
    fn status_serialises_with_a_state_tag() {
        let json = serde_json::to_value(SyncStatus::RemoteNewer {
            message: "kept".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "remote_newer");
        assert_eq!(json["message"], "kept");
        assert_eq!(
            serde_json::to_value(SyncStatus::Synced).unwrap()["state"],
            "synced"
        );
    }
}
