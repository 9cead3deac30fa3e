//! Upstream download-statistics sources.
//!
//! This crate provides:
//! - The `StatsSource` capability used by the fetch orchestrator
//! - An npm downloads API client

pub mod error;
pub mod npm;
pub mod traits;

pub use error::{UpstreamError, UpstreamResult};
pub use npm::NpmRegistryClient;
pub use traits::StatsSource;

use std::sync::Arc;
use tally_core::config::UpstreamConfig;

/// Create a statistics source from configuration.
pub fn from_config(config: &UpstreamConfig) -> UpstreamResult<Arc<dyn StatsSource>> {
    let client = NpmRegistryClient::new(&config.base_url, &config.user_agent, config.timeout())?;
    Ok(Arc::new(client))
}
