//! Tally server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tally_core::SystemClock;
use tally_core::config::AppConfig;
use tally_server::{AppState, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tally - an incremental cache of npm download statistics
#[derive(Parser, Debug)]
#[command(name = "tallyd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "TALLY_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

/// Load configuration from an optional TOML file overlaid with `TALLY_` env vars.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if std::path::Path::new(path).exists() {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::info!("No config file found at {}, using defaults and environment", path);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("TALLY_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Tally v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    tally_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let metadata = tally_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    let upstream = tally_upstream::from_config(&config.upstream)
        .context("failed to initialize upstream client")?;
    tracing::info!(base_url = %config.upstream.base_url, "Upstream client initialized");

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    let state = AppState::new(config, metadata, upstream, Arc::new(SystemClock));
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
