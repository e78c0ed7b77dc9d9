//! Error types raised by the CouchDB remote store.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::{StorageError, StorageErrorKind};

/// Convenient result alias returning [`CouchDaoError`] failures.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while interacting with CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable is missing.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The configured base URL has no http(s) scheme.
    #[error("CouchDB base URL `{url}` must start with http:// or https://")]
    InvalidBaseUrl { url: String },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent or no response arrived.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with an unexpected status code.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// `_uuids` returned an empty list.
    #[error("CouchDB returned no server-generated identifier")]
    MissingUuid,
    /// A document identifier does not belong to the expected collection.
    #[error("invalid document ID `{doc_id}` for collection `{collection}`")]
    InvalidDocId {
        doc_id: String,
        collection: &'static str,
    },
}

/// Map an HTTP status onto the shared failure classes.
pub(super) fn classify_status(status: StatusCode) -> StorageErrorKind {
    match status.as_u16() {
        401 | 403 => StorageErrorKind::PermissionDenied,
        404 => StorageErrorKind::NotFound,
        408 | 504 => StorageErrorKind::DeadlineExceeded,
        429 => StorageErrorKind::ResourceExhausted,
        500..=599 => StorageErrorKind::Unavailable,
        400 | 409 | 412 | 415 => StorageErrorKind::InvalidDocument,
        _ => StorageErrorKind::Unknown,
    }
}

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        let kind = match &err {
            CouchDaoError::MissingEnvVar { .. } | CouchDaoError::InvalidBaseUrl { .. } => {
                StorageErrorKind::Misconfigured
            }
            CouchDaoError::ClientBuilder { .. } => StorageErrorKind::Unknown,
            CouchDaoError::RequestSend { source, .. } if source.is_timeout() => {
                StorageErrorKind::DeadlineExceeded
            }
            CouchDaoError::RequestSend { .. } => StorageErrorKind::Unavailable,
            CouchDaoError::RequestStatus { status, .. } => classify_status(*status),
            CouchDaoError::DecodeResponse { .. }
            | CouchDaoError::MissingUuid
            | CouchDaoError::InvalidDocId { .. } => StorageErrorKind::InvalidDocument,
        };
        StorageError::new(kind, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_failure_classes() {
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            StorageErrorKind::PermissionDenied
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            StorageErrorKind::PermissionDenied
        );
        assert_eq!(
            classify_status(StatusCode::GATEWAY_TIMEOUT),
            StorageErrorKind::DeadlineExceeded
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            StorageErrorKind::ResourceExhausted
        );
        assert_eq!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE),
            StorageErrorKind::Unavailable
        );
        assert_eq!(
            classify_status(StatusCode::CONFLICT),
            StorageErrorKind::InvalidDocument
        );
    }

    #[test]
    fn forbidden_status_is_not_retried() {
        let err: StorageError = CouchDaoError::RequestStatus {
            path: "players::abc".into(),
            status: StatusCode::FORBIDDEN,
        }
        .into();
        assert_eq!(err.kind(), StorageErrorKind::PermissionDenied);
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_are_retried() {
        let err: StorageError = CouchDaoError::RequestStatus {
            path: "_all_docs".into(),
            status: StatusCode::BAD_GATEWAY,
        }
        .into();
        assert!(err.is_retryable());
    }
}
