//! Configuration types shared across crates.

use crate::range::RangePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// PostgreSQL SSL mode configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PgSslMode {
    /// Disable SSL/TLS entirely.
    Disable,
    /// Prefer SSL/TLS but allow unencrypted connections (default).
    #[default]
    Prefer,
    /// Require SSL/TLS for all connections.
    Require,
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database (single-node deployments and tests).
    Sqlite {
        /// Database file path, or ":memory:".
        path: PathBuf,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL. Takes precedence over individual fields.
        url: Option<String>,
        /// Database host.
        host: Option<String>,
        /// Database port (default: 5432).
        #[serde(default = "default_pg_port")]
        port: Option<u16>,
        /// Database username.
        username: Option<String>,
        /// Database password.
        /// WARNING: Prefer TALLY_METADATA__PASSWORD over storing it in config.
        password: Option<String>,
        /// Database name.
        database: Option<String>,
        /// SSL mode for connections.
        ssl_mode: Option<PgSslMode>,
        /// Maximum connections in the pool.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        /// Statement timeout in milliseconds.
        #[serde(default = "default_statement_timeout_ms")]
        statement_timeout_ms: Option<u64>,
    },
}

fn default_max_connections() -> u32 {
    10
}

fn default_pg_port() -> Option<u16> {
    Some(5432)
}

fn default_statement_timeout_ms() -> Option<u64> {
    Some(30_000)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/tally.db"),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { .. } => Ok(()),
            MetadataConfig::Postgres {
                url,
                host,
                database,
                ..
            } => match (url.as_ref(), host.as_ref(), database.as_ref()) {
                (Some(_), _, _) => Ok(()),
                (None, Some(_), Some(_)) => Ok(()),
                (None, None, _) => Err(
                    "postgres config requires either 'url' or 'host' + 'database'".to_string(),
                ),
                (None, Some(_), None) => Err(
                    "postgres config requires 'database' when using individual fields".to_string(),
                ),
            },
        }
    }
}

/// Upstream statistics source configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the downloads API.
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_upstream_base_url() -> String {
    "https://api.npmjs.org".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tally/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            timeout_secs: default_upstream_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Range policies per request class.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Policy for single-package requests.
    #[serde(default = "default_package_policy")]
    pub package: RangePolicy,
    /// Policy for the all-packages aggregate; smaller spans keep upstream load low.
    #[serde(default = "default_global_policy")]
    pub global: RangePolicy,
}

fn default_package_policy() -> RangePolicy {
    RangePolicy::new(7, 540)
}

fn default_global_policy() -> RangePolicy {
    RangePolicy::new(3, 90)
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            package: default_package_policy(),
            global: default_global_policy(),
        }
    }
}

impl PolicyConfig {
    /// Policy for a package name; the empty name is the global aggregate.
    pub fn for_package(&self, name: &str) -> RangePolicy {
        if crate::package::is_global(name) {
            self.global
        } else {
            self.package
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.package
            .validate()
            .map_err(|e| format!("policy.package: {e}"))?;
        self.global
            .validate()
            .map_err(|e| format!("policy.global: {e}"))?;
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Upstream source configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Range policies.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl AppConfig {
    /// Create a test configuration backed by in-memory SQLite.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            metadata: MetadataConfig::Sqlite {
                path: PathBuf::from(":memory:"),
            },
            ..Default::default()
        }
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<(), String> {
        self.metadata.validate()?;
        self.policy.validate()?;
        if self.upstream.timeout_secs == 0 {
            return Err("upstream.timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        AppConfig::default().validate().unwrap();
        AppConfig::for_testing().validate().unwrap();
    }

    #[test]
    fn test_global_policy_is_tighter() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.for_package(""), policy.global);
        assert_eq!(policy.for_package("react"), policy.package);
        assert!(policy.global.max_span_days < policy.package.max_span_days);
        assert!(policy.global.min_gap_days < policy.package.min_gap_days);
    }

    #[test]
    fn test_partial_policy_uses_defaults() {
        let json = r#"{"policy": {"package": {"min_gap_days": 2, "max_span_days": 30}}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.policy.package, RangePolicy::new(2, 30));
        assert_eq!(config.policy.global, default_global_policy());
        assert_eq!(config.upstream.base_url, "https://api.npmjs.org");
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let mut config = AppConfig::for_testing();
        config.policy.global = RangePolicy::new(100, 10);
        let err = config.validate().unwrap_err();
        assert!(err.contains("policy.global"));
    }

    #[test]
    fn test_postgres_config_requires_database() {
        let config = MetadataConfig::Postgres {
            url: None,
            host: Some("localhost".to_string()),
            port: None,
            username: None,
            password: None,
            database: None,
            ssl_mode: None,
            max_connections: 5,
            statement_timeout_ms: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metadata_config_tagged_by_type() {
        let json = r#"{"type": "sqlite", "path": "/tmp/tally.db"}"#;
        let config: MetadataConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config, MetadataConfig::Sqlite { ref path } if path.ends_with("tally.db")));
    }
}
