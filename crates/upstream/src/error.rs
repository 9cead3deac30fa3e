//! Upstream error types.

use thiserror::Error;

/// Truncate an upstream body for display, capping at MAX_DISPLAYED characters.
fn format_body(body: &str) -> String {
    const MAX_DISPLAYED: usize = 200;
    if body.chars().count() <= MAX_DISPLAYED {
        body.to_string()
    } else {
        let sample: String = body.chars().take(MAX_DISPLAYED).collect();
        format!("{sample}...")
    }
}

/// Upstream request errors.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {}", format_body(.body))]
    Status { status: u16, body: String },

    #[error("invalid upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;
