use mongodb::error::{Error as MongoError, ErrorKind};
use thiserror::Error;

use crate::dao::storage::{StorageError, StorageErrorKind};

/// Result alias for MongoDB operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Server error codes with a dedicated failure class.
const UNAUTHORIZED_CODE: i32 = 13;
const MAX_TIME_EXPIRED_CODE: i32 = 50;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// A required variable is not set.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    /// The driver rejected the client options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// The first ping after connecting failed.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// A health check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// Inserting a document failed.
    #[error("failed to create document in `{collection}`")]
    Create {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    /// Reading a document failed.
    #[error("failed to load document `{id}` from `{collection}`")]
    Fetch {
        collection: &'static str,
        id: String,
        #[source]
        source: MongoError,
    },
    /// Replacing a document failed.
    #[error("failed to replace document `{id}` in `{collection}`")]
    Replace {
        collection: &'static str,
        id: String,
        #[source]
        source: MongoError,
    },
    /// Deleting a document failed.
    #[error("failed to delete document `{id}` from `{collection}`")]
    Delete {
        collection: &'static str,
        id: String,
        #[source]
        source: MongoError,
    },
    /// Listing a collection failed.
    #[error("failed to list documents of `{collection}`")]
    Snapshot {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
}

impl MongoDaoError {
    fn driver_error(&self) -> Option<&MongoError> {
        match self {
            MongoDaoError::MissingEnvVar { .. } => None,
            MongoDaoError::InvalidUri { source, .. }
            | MongoDaoError::ClientConstruction { source }
            | MongoDaoError::InitialPing { source, .. }
            | MongoDaoError::HealthPing { source }
            | MongoDaoError::Create { source, .. }
            | MongoDaoError::Fetch { source, .. }
            | MongoDaoError::Replace { source, .. }
            | MongoDaoError::Delete { source, .. }
            | MongoDaoError::Snapshot { source, .. } => Some(source),
        }
    }
}

/// Map a driver error onto the shared failure classes.
pub(super) fn classify(err: &MongoError) -> StorageErrorKind {
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => StorageErrorKind::PermissionDenied,
        ErrorKind::Command(command) if command.code == UNAUTHORIZED_CODE => {
            StorageErrorKind::PermissionDenied
        }
        ErrorKind::Command(command) if command.code == MAX_TIME_EXPIRED_CODE => {
            StorageErrorKind::DeadlineExceeded
        }
        ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            StorageErrorKind::DeadlineExceeded
        }
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } => {
            StorageErrorKind::Unavailable
        }
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            StorageErrorKind::InvalidDocument
        }
        _ => StorageErrorKind::Unknown,
    }
}

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        let kind = match &err {
            MongoDaoError::MissingEnvVar { .. } | MongoDaoError::InvalidUri { .. } => {
                StorageErrorKind::Misconfigured
            }
            MongoDaoError::InitialPing { .. } => StorageErrorKind::Unavailable,
            other => other
                .driver_error()
                .map(classify)
                .unwrap_or(StorageErrorKind::Unknown),
        };
        StorageError::new(kind, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_is_a_configuration_problem() {
        let err: StorageError = MongoDaoError::MissingEnvVar { var: "MONGO_URI" }.into();
        assert_eq!(err.kind(), StorageErrorKind::Misconfigured);
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_failures_are_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: StorageError = MongoDaoError::HealthPing {
            source: MongoError::from(io),
        }
        .into();
        assert_eq!(err.kind(), StorageErrorKind::Unavailable);
        assert!(err.is_retryable());
    }
}
