//! Application state shared across handlers.

use crate::fetch::StatsFetcher;
use std::sync::Arc;
use tally_core::Clock;
use tally_core::config::AppConfig;
use tally_metadata::MetadataStore;
use tally_upstream::StatsSource;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Orchestrator over the metadata store and the upstream source.
    pub fetcher: Arc<StatsFetcher>,
    /// Source of "now"; fixed in tests.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if the configuration fails validation. The binary validates
    /// before getting here, so this only trips on hand-built configs.
    pub fn new(
        config: AppConfig,
        metadata: Arc<dyn MetadataStore>,
        upstream: Arc<dyn StatsSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if let Err(error) = config.validate() {
            panic!("Invalid configuration: {}", error);
        }

        let fetcher = Arc::new(StatsFetcher::new(
            metadata.clone(),
            upstream,
            clock.clone(),
        ));

        Self {
            config: Arc::new(config),
            metadata,
            fetcher,
            clock,
        }
    }
}
