//! API error types.
//!
//! Every failure renders Ghost's error envelope so publishing clients can
//! parse it: `{"errors":[{"message": ..., "type": ...}]}`. No HTML error
//! pages, ever.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// One entry in the Ghost error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    /// Human-readable error message.
    pub message: String,
    /// Ghost-style error type name.
    #[serde(rename = "type")]
    pub error_type: String,
}

/// The Ghost error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub errors: Vec<ErrorEntry>,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No blog matched the tenant locator. Distinct from every auth failure.
    #[error("Blog not found")]
    BlogNotFound,

    #[error("Authorization header required in the form 'Ghost <token>'")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Verified credential is bound to a different blog than the one resolved.
    #[error("Token does not grant access to this blog")]
    ForbiddenForBlog,

    #[error("{0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Image of {size_mb:.2} MB exceeds the maximum upload size of {limit_mb:.2} MB")]
    PayloadTooLarge { size_mb: f64, limit_mb: f64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[from] lantern_storage::StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] lantern_metadata::MetadataError),

    #[error("{0}")]
    Core(#[from] lantern_core::Error),
}

impl ApiError {
    /// Construct a 413 from a measured size and the configured ceiling.
    pub fn payload_too_large(size_bytes: u64, limit_bytes: u64) -> Self {
        const MB: f64 = 1024.0 * 1024.0;
        Self::PayloadTooLarge {
            size_mb: size_bytes as f64 / MB,
            limit_mb: limit_bytes as f64 / MB,
        }
    }

    /// Get the Ghost error type name for this error.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::BlogNotFound | Self::NotFound(_) => "NotFoundError",
            Self::MissingAuth | Self::InvalidToken | Self::TokenExpired => "UnauthorizedError",
            Self::ForbiddenForBlog => "NoPermissionError",
            Self::BadRequest(_) | Self::Core(_) => "BadRequestError",
            Self::UnsupportedMediaType(_) => "UnsupportedMediaTypeError",
            Self::PayloadTooLarge { .. } => "RequestEntityTooLargeError",
            Self::Internal(_) => "InternalServerError",
            Self::Storage(e) => match e {
                lantern_storage::StorageError::NotFound(_) => "NotFoundError",
                _ => "InternalServerError",
            },
            Self::Metadata(e) => match e {
                lantern_metadata::MetadataError::NotFound(_) => "NotFoundError",
                _ => "InternalServerError",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BlogNotFound | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingAuth | Self::InvalidToken | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::ForbiddenForBlog => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::UnsupportedMediaType(_) | Self::Core(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(e) => match e {
                lantern_storage::StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Metadata(e) => match e {
                lantern_metadata::MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorEnvelope {
            errors: vec![ErrorEntry {
                message: self.to_string(),
                error_type: self.error_type().to_string(),
            }],
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BlogNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MissingAuth.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::ForbiddenForBlog.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::payload_too_large(10_000_000, 4_718_592).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_payload_too_large_reports_mb() {
        let err = ApiError::payload_too_large(5 * 1024 * 1024, 4_718_592);
        let message = err.to_string();
        assert!(message.contains("5.00 MB"), "{message}");
        assert!(message.contains("4.50 MB"), "{message}");
    }
}
