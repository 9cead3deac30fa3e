//! Server test utilities.

use super::fixtures::NOW;
use super::upstream::ScriptedSource;
use std::sync::Arc;
use tally_core::FixedClock;
use tally_core::config::{AppConfig, MetadataConfig};
use tally_metadata::{MetadataStore, SqliteStore};
use tally_server::{AppState, create_router};
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub upstream: Arc<ScriptedSource>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a test server over a scripted upstream, with the clock fixed at [`NOW`].
    pub async fn new(upstream: ScriptedSource) -> Self {
        Self::with_config(upstream, |_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(upstream: ScriptedSource, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let db_path = temp_dir.path().join("tally.db");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );

        let mut config = AppConfig {
            metadata: MetadataConfig::Sqlite { path: db_path },
            ..AppConfig::for_testing()
        };
        modifier(&mut config);

        let upstream = Arc::new(upstream);
        let state = AppState::new(
            config,
            metadata,
            upstream.clone(),
            Arc::new(FixedClock(NOW)),
        );
        let router = create_router(state.clone());

        Self {
            router,
            state,
            upstream,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }
}
