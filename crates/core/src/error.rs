//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("invalid range: {start} .. {end}")]
    InvalidRange { start: String, end: String },

    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
