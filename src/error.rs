/*!
 * Error types for vfolder
 */

use crate::backend::BackendError;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Failure of a namespace operation
#[derive(Error, Debug)]
pub enum StorageError {
    /// Malformed or missing required input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key or prefix does not exist
    #[error("Resource not found: {id}")]
    NotFound {
        id: String,
        #[source]
        source: Option<BackendError>,
    },

    /// Operation not valid for the resource's type
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The store answered with a service-level error
    #[error("{context}: {source}")]
    BackendRejected {
        context: String,
        #[source]
        source: BackendError,
    },

    /// The store could not be reached, timed out, or local I/O failed
    #[error("{context}: {source}")]
    BackendUnavailable {
        context: String,
        #[source]
        source: BackendError,
    },
}

impl StorageError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        StorageError::InvalidArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        StorageError::UnsupportedOperation(message.into())
    }

    /// A miss detected without a backend error (empty listing, head says no)
    pub fn not_found(id: impl Into<String>) -> Self {
        StorageError::NotFound {
            id: id.into(),
            source: None,
        }
    }

    /// Reclassify a backend failure, keeping it as the source
    ///
    /// `context` names the operation and key, e.g. `"download docs/a.txt"`.
    pub fn from_backend(context: impl Into<String>, error: BackendError) -> Self {
        let context = context.into();
        match error {
            BackendError::NotFound { ref key, .. } => StorageError::NotFound {
                id: key.clone(),
                source: Some(error),
            },
            BackendError::Rejected { .. } => StorageError::BackendRejected {
                context,
                source: error,
            },
            BackendError::Unavailable { .. }
            | BackendError::Io(_)
            | BackendError::InvalidConfig { .. } => StorageError::BackendUnavailable {
                context,
                source: error,
            },
        }
    }

    /// Bare category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StorageError::NotFound { .. } => ErrorKind::NotFound,
            StorageError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            StorageError::BackendRejected { .. } => ErrorKind::BackendRejected,
            StorageError::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
        }
    }

    /// Status reported by the store for a rejected request
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            StorageError::BackendRejected { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the caller is at fault (as opposed to the store)
    pub fn is_client_error(&self) -> bool {
        self.kind().is_client_error()
    }
}

/// Error category, independent of context and source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    UnsupportedOperation,
    BackendRejected,
    BackendUnavailable,
}

impl ErrorKind {
    /// Stable machine-readable code used in error bodies
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            ErrorKind::BackendRejected => "BACKEND_REJECTED",
            ErrorKind::BackendUnavailable => "BACKEND_UNAVAILABLE",
        }
    }

    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidArgument | ErrorKind::NotFound | ErrorKind::UnsupportedOperation
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_not_found_keeps_key_and_source() {
        let err = StorageError::from_backend(
            "download docs/a.txt",
            BackendError::not_found("s3", "docs/a.txt"),
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Resource not found: docs/a.txt");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_transport_failures_are_unavailable() {
        let timeout = BackendError::unavailable(
            "s3",
            "request timed out",
            io::Error::new(io::ErrorKind::TimedOut, "slow"),
        );
        let err = StorageError::from_backend("list docs/", timeout);
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
        assert!(err.to_string().starts_with("list docs/: "));

        let io_err: BackendError = io::Error::new(io::ErrorKind::Other, "disk").into();
        assert_eq!(
            StorageError::from_backend("upload k", io_err).kind(),
            ErrorKind::BackendUnavailable
        );
    }

    #[test]
    fn test_service_errors_are_rejected_with_status() {
        let rejected = BackendError::Rejected {
            backend: "s3".to_string(),
            code: "AccessDenied".to_string(),
            message: "Access Denied".to_string(),
            status: Some(403),
        };
        let err = StorageError::from_backend("head secret.txt", rejected);
        assert_eq!(err.kind(), ErrorKind::BackendRejected);
        assert_eq!(err.backend_status(), Some(403));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_codes() {
        assert_eq!(ErrorKind::InvalidArgument.code(), "INVALID_ARGUMENT");
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
        assert!(StorageError::unsupported("x").is_client_error());
        assert!(StorageError::not_found("k").source().is_none());
    }
}
