//! Error types for the HTTP layer
//!
//! Every failure leaves the server as `{code, message, timestamp}` with a
//! status derived from the storage error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vfolder::{ErrorKind, StorageError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Request could not be decoded (bad multipart, missing part)
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    /// RFC 3339 UTC
    pub timestamp: String,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Storage(e) => e.kind(),
            ApiError::BadRequest(_) => ErrorKind::InvalidArgument,
            ApiError::Internal(_) => ErrorKind::BackendUnavailable,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidArgument | ErrorKind::UnsupportedOperation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BackendRejected => self.passthrough_status(),
            ErrorKind::BackendUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Store-reported status when it is a real 4xx/5xx, else 500
    fn passthrough_status(&self) -> StatusCode {
        match self {
            ApiError::Storage(e) => e
                .backend_status()
                .filter(|s| (400..=599).contains(s))
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.kind().code().to_string(),
            message: self.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.kind().is_client_error() {
            tracing::warn!("{} {}: {}", status.as_u16(), self.kind(), self);
        } else {
            tracing::error!("{} {}: {}", status.as_u16(), self.kind(), self);
        }

        (status, Json(self.to_body())).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("Multipart error: {}", err))
    }
}
