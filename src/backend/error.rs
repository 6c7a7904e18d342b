//! Error types for the object store port
//!
//! Every store implementation reports failures through [`BackendError`]. The
//! namespace translator later folds these into the smaller
//! [`StorageError`](crate::error::StorageError) taxonomy.

use std::io;
use thiserror::Error;

/// Result type alias for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Unified error type for object store operations
#[derive(Error, Debug)]
pub enum BackendError {
    /// Key does not exist in the store
    #[error("Key not found on {backend}: {key}")]
    NotFound { key: String, backend: String },

    /// The store answered, but refused the request (permissions, quota, bad request)
    #[error("{backend} rejected the request ({code}): {message}")]
    Rejected {
        backend: String,
        code: String,
        message: String,
        /// HTTP-like status reported by the store, when it has one
        status: Option<u16>,
    },

    /// The store could not be reached or did not answer in time
    #[error("{backend} unavailable: {message}")]
    Unavailable {
        backend: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Local I/O error while moving object bytes
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Store configuration is unusable
    #[error("Invalid configuration for {backend}: {message}")]
    InvalidConfig { backend: String, message: String },
}

impl BackendError {
    /// Build a `NotFound` error
    pub fn not_found(backend: &str, key: &str) -> Self {
        BackendError::NotFound {
            key: key.to_string(),
            backend: backend.to_string(),
        }
    }

    /// Build a `Rejected` error without a status
    pub fn rejected(backend: &str, code: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Rejected {
            backend: backend.to_string(),
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Attach the store-reported status to a `Rejected` error
    pub fn with_status(mut self, status: u16) -> Self {
        if let BackendError::Rejected { status: slot, .. } = &mut self {
            *slot = Some(status);
        }
        self
    }

    /// Build an `Unavailable` error wrapping its cause
    pub fn unavailable<E>(backend: &str, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BackendError::Unavailable {
            backend: backend.to_string(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error indicates the key was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }

    /// Check if this error is a transport-level failure
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable { .. } | BackendError::Io(_))
    }

    /// Status reported by the store, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => *status,
            BackendError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Get the backend name associated with this error, if any
    pub fn backend_name(&self) -> Option<&str> {
        match self {
            BackendError::NotFound { backend, .. } => Some(backend),
            BackendError::Rejected { backend, .. } => Some(backend),
            BackendError::Unavailable { backend, .. } => Some(backend),
            BackendError::InvalidConfig { backend, .. } => Some(backend),
            BackendError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::rejected("s3", "AccessDenied", "no read access");
        assert_eq!(
            err.to_string(),
            "s3 rejected the request (AccessDenied): no read access"
        );

        let err = BackendError::not_found("memory", "a/b.txt");
        assert_eq!(err.to_string(), "Key not found on memory: a/b.txt");
    }

    #[test]
    fn test_with_status_only_touches_rejected() {
        let err = BackendError::rejected("local", "KeyTooLongError", "too long").with_status(400);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.backend_name(), Some("local"));

        let err = BackendError::not_found("memory", "k").with_status(400);
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_io_error_is_unavailable() {
        let err: BackendError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(err.is_unavailable());
        assert!(!err.is_not_found());
        assert_eq!(err.backend_name(), None);
    }

    #[test]
    fn test_unavailable_keeps_source() {
        use std::error::Error as _;

        let cause = io::Error::new(io::ErrorKind::TimedOut, "timed out");
        let err = BackendError::unavailable("s3", "dispatch failure", cause);
        assert!(err.source().is_some());
        assert_eq!(err.backend_name(), Some("s3"));
    }

    #[test]
    fn test_status() {
        let err = BackendError::Rejected {
            backend: "s3".to_string(),
            code: "SlowDown".to_string(),
            message: "reduce your request rate".to_string(),
            status: Some(503),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(BackendError::not_found("s3", "k").status(), Some(404));
    }
}
