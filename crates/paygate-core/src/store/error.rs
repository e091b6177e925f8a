//! Error types for record storage operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while persisting or reading encrypted records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record id cannot be used as a storage key. Caller input problem.
    #[error("invalid record id '{record_id}': {reason}")]
    InvalidRecordId { record_id: String, reason: String },

    /// Record not found.
    #[error("record not found: {record_id}")]
    NotFound { record_id: String },

    /// Backend refused the credentials or the operation.
    #[error("access denied for record {record_id}: {source}")]
    AccessDenied {
        record_id: String,
        #[source]
        source: object_store::Error,
    },

    /// Invalid store specification (URL parsing failed).
    #[error("invalid store spec '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },

    /// Network or I/O error.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Stored object does not have the record shape.
    #[error("corrupt record {record_id}: {message}")]
    Corrupt { record_id: String, message: String },

    /// Failure reported by the underlying object store, passed through as-is.
    #[error("object store error: {0}")]
    ObjectStore(#[source] object_store::Error),

    /// Other errors.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for problems with the caller's input rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRecordId { .. })
    }

    /// Suggested exit code for CLI (2 = configuration, 4 = not found).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidSpec { .. } => 2,
            Self::NotFound { .. } => 4,
            _ => 1,
        }
    }

    /// Create from object_store error with context about the record.
    pub fn from_object_store(err: object_store::Error, record_id: &str) -> Self {
        match &err {
            object_store::Error::NotFound { .. } => StoreError::NotFound {
                record_id: record_id.to_string(),
            },
            object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. } => StoreError::AccessDenied {
                record_id: record_id.to_string(),
                source: err,
            },
            _ => StoreError::ObjectStore(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn denied() -> object_store::Error {
        object_store::Error::PermissionDenied {
            path: "vault/cards/card-1.json".to_string(),
            source: "role/app is not allowed to PutObject".into(),
        }
    }

    #[test]
    fn test_access_denied_keeps_backend_error() {
        let err = StoreError::from_object_store(denied(), "card-1");
        assert!(matches!(
            &err,
            StoreError::AccessDenied { record_id, .. } if record_id == "card-1"
        ));
        assert_eq!(err.exit_code(), 1);

        let source = err.source().expect("source kept");
        assert!(source.is::<object_store::Error>());
        assert!(source.to_string().contains("vault/cards/card-1.json"));
        assert!(source
            .source()
            .is_some_and(|inner| inner.to_string().contains("PutObject")));
    }

    #[test]
    fn test_not_found_carries_record_id() {
        let err = StoreError::from_object_store(
            object_store::Error::NotFound {
                path: "cards/card-2.json".to_string(),
                source: "missing".into(),
            },
            "card-2",
        );
        assert!(err.is_not_found());
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "record not found: card-2");
    }

    #[test]
    fn test_other_backend_errors_pass_through() {
        let err = StoreError::from_object_store(
            object_store::Error::Generic {
                store: "S3",
                source: "connection reset".into(),
            },
            "card-3",
        );
        assert!(matches!(err, StoreError::ObjectStore(_)));
        assert!(err.source().is_some());
    }
}
