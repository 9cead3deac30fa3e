//! API error types.
//!
//! Failures are answered with a plain-text body; only a malformed package
//! name or query is the caller's fault, everything else is a 500.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] tally_metadata::MetadataError),

    #[error("upstream error: {0}")]
    Upstream(#[from] tally_upstream::UpstreamError),

    #[error("{0}")]
    Core(#[from] tally_core::Error),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(e) => match e {
                tally_core::Error::InvalidPackageName(_)
                | tally_core::Error::InvalidRange { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Metadata(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
