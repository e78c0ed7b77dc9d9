use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::{
        local_cache::CacheError,
        storage::{StorageError, StorageErrorKind},
    },
    services::team_generator::TeamGenerationError,
};

/// Failures of a [`LocalRemoteStore`](crate::state::LocalRemoteStore) operation.
///
/// Local writes are never rolled back when one of these is returned.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The gate is offline or no backend is installed; no remote call was made.
    #[error("remote store is offline")]
    Offline,
    #[error("record `{0}` not found")]
    NotFound(String),
    /// The record was deleted while its push was in flight.
    #[error("sync cancelled because the record was deleted")]
    Cancelled,
    #[error("permission denied by the remote store")]
    PermissionDenied(#[source] StorageError),
    #[error("remote store request failed")]
    Remote(#[source] StorageError),
    #[error("local cache failure")]
    Cache(#[from] CacheError),
    #[error("failed to encode record")]
    Encode(#[from] serde_json::Error),
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        match err.kind() {
            StorageErrorKind::PermissionDenied => SyncError::PermissionDenied(err),
            _ => SyncError::Remote(err),
        }
    }
}

impl SyncError {
    /// Short human-readable text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Offline => "Saved on this device; will sync when back online.".into(),
            SyncError::NotFound(_) => "This item no longer exists.".into(),
            SyncError::Cancelled => "Sync skipped: the item was deleted.".into(),
            SyncError::PermissionDenied(_) => {
                "You don't have permission to change this. Saved on this device only.".into()
            }
            SyncError::Remote(err) if err.is_retryable() => {
                "Couldn't reach the server. Saved on this device; will retry later.".into()
            }
            SyncError::Remote(err) => format!("Sync failed: {}", err.message()),
            SyncError::Cache(_) => "Couldn't save on this device.".into(),
            SyncError::Encode(_) => "Couldn't prepare this item for sync.".into(),
        }
    }
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Remote store is not reachable right now.
    #[error("remote store offline")]
    Offline,
    /// Remote store rejected or failed the request.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Remote store denied access.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Local persistence failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SyncError> for ServiceError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Offline => ServiceError::Offline,
            SyncError::NotFound(id) => ServiceError::NotFound(format!("record `{id}`")),
            SyncError::Cancelled => {
                ServiceError::InvalidState("record was deleted while syncing".into())
            }
            SyncError::PermissionDenied(source) => {
                ServiceError::Forbidden(source.message().to_string())
            }
            SyncError::Remote(source) => ServiceError::Unavailable(source),
            SyncError::Cache(source) => ServiceError::Internal(source.to_string()),
            SyncError::Encode(source) => ServiceError::Internal(source.to_string()),
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<TeamGenerationError> for ServiceError {
    fn from(err: TeamGenerationError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Remote store denied the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or offline.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Offline => AppError::ServiceUnavailable("remote store offline".into()),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_failures_get_their_own_variant() {
        let err = SyncError::from(StorageError::permission_denied("missing role"));
        assert!(matches!(err, SyncError::PermissionDenied(_)));
        let app: AppError = ServiceError::from(err).into();
        assert!(matches!(app, AppError::Forbidden(ref message) if message == "missing role"));
    }

    #[test]
    fn transient_failures_promise_a_retry() {
        let err = SyncError::from(StorageError::new(StorageErrorKind::Unavailable, "down"));
        assert!(err.user_message().contains("retry"));
    }

    #[test]
    fn status_codes_follow_the_error_class() {
        let response = AppError::from(ServiceError::Offline).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let response = AppError::NotFound("record".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
