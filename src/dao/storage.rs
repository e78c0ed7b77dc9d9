use std::{error::Error, fmt};

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

type BoxError = Box<dyn Error + Send + Sync>;

/// Failure classes shared by every remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// Backend unreachable or refusing connections.
    Unavailable,
    /// The call did not complete in time.
    DeadlineExceeded,
    /// Rate limited or over quota.
    ResourceExhausted,
    /// Credentials rejected.
    PermissionDenied,
    /// The addressed document does not exist.
    NotFound,
    /// A document could not be encoded or decoded.
    InvalidDocument,
    /// Backend settings are missing or invalid.
    Misconfigured,
    /// Anything else.
    Unknown,
}

impl StorageErrorKind {
    /// Short machine-readable code, e.g. `deadline-exceeded`.
    pub const fn code(self) -> &'static str {
        match self {
            StorageErrorKind::Unavailable => "unavailable",
            StorageErrorKind::DeadlineExceeded => "deadline-exceeded",
            StorageErrorKind::ResourceExhausted => "resource-exhausted",
            StorageErrorKind::PermissionDenied => "permission-denied",
            StorageErrorKind::NotFound => "not-found",
            StorageErrorKind::InvalidDocument => "invalid-document",
            StorageErrorKind::Misconfigured => "misconfigured",
            StorageErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct StorageError {
    kind: StorageErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

/// Message fragments that mark an otherwise unclassified failure as transient.
const TRANSIENT_MARKERS: [&str; 3] = ["timeout", "network", "connection"];

impl StorageError {
    /// Error of `kind` with no underlying source.
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying backend failure.
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(StorageErrorKind::Unavailable, message).with_source(source)
    }

    /// The call timed out.
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::DeadlineExceeded, message)
    }

    /// Credentials were rejected.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::PermissionDenied, message)
    }

    /// The addressed document does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound, message)
    }

    /// A document failed to encode or decode.
    pub fn invalid_document(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(StorageErrorKind::InvalidDocument, message).with_source(source)
    }

    /// Classification used by the retry policy.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// `unavailable`, `deadline-exceeded` and `resource-exhausted` always
    /// qualify and `permission-denied` never does. Any other failure qualifies
    /// only when its message or source mentions a timeout or network problem.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            StorageErrorKind::Unavailable
            | StorageErrorKind::DeadlineExceeded
            | StorageErrorKind::ResourceExhausted => true,
            StorageErrorKind::PermissionDenied => false,
            _ => {
                let mut text = self.message.to_ascii_lowercase();
                if let Some(source) = &self.source {
                    text.push(' ');
                    text.push_str(&source.to_string().to_ascii_lowercase());
                }
                TRANSIENT_MARKERS.iter().any(|marker| text.contains(marker))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        for kind in [
            StorageErrorKind::Unavailable,
            StorageErrorKind::DeadlineExceeded,
            StorageErrorKind::ResourceExhausted,
        ] {
            assert!(StorageError::new(kind, "boom").is_retryable(), "{kind}");
        }
    }

    #[test]
    fn permission_and_not_found_are_fatal() {
        assert!(!StorageError::permission_denied("missing role").is_retryable());
        assert!(!StorageError::not_found("players::x").is_retryable());
    }

    #[test]
    fn unknown_errors_mentioning_the_network_are_retryable() {
        let err = StorageError::new(StorageErrorKind::Unknown, "Network request failed");
        assert!(err.is_retryable());
        let err = StorageError::new(StorageErrorKind::Unknown, "Request TIMEOUT");
        assert!(err.is_retryable());
        let err = StorageError::new(StorageErrorKind::Unknown, "bad payload");
        assert!(!err.is_retryable());
    }

    #[test]
    fn source_text_counts_towards_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset by peer");
        let err = StorageError::new(StorageErrorKind::Unknown, "write failed").with_source(io);
        assert!(err.is_retryable());
    }

    #[test]
    fn display_includes_code() {
        let err = StorageError::deadline_exceeded("fetch timed out");
        assert_eq!(err.to_string(), "deadline-exceeded: fetch timed out");
    }
}
