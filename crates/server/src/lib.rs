//! HTTP surface for the tally download-statistics cache.
//!
//! This crate provides:
//! - The fetch orchestrator that extends a package's cached history one range at a time
//! - Download and average endpoints over the metadata store
//! - Health and Prometheus endpoints

pub mod error;
pub mod fetch;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use fetch::StatsFetcher;
pub use routes::create_router;
pub use state::AppState;
