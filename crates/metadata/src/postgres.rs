//! PostgreSQL-based metadata store implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{AverageRow, PackageRow, StatisticRow};
use crate::repos::statistics::MAX_ROWS_PER_INSERT;
use crate::repos::{PackageRepo, StatisticRepo};
use crate::store::MetadataStore;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres, QueryBuilder};
use std::str::FromStr;
use tally_core::DailyStatistic;
use tally_core::config::PgSslMode;
use time::Date;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Create a new PostgreSQL store from individual connection parameters.
    ///
    /// This allows the password to come from a separate source such as an
    /// environment variable.
    #[allow(clippy::too_many_arguments)]
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        if let Some(mode) = ssl_mode {
            let sqlx_mode = match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            };
            opts = opts.ssl_mode(sqlx_mode);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    async fn connect(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // Prepared statements cannot hold several commands, so run them one by one.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PackageRepo for PostgresStore {
    async fn get_package_by_name(&self, name: &str) -> MetadataResult<Option<PackageRow>> {
        let row = sqlx::query_as::<_, PackageRow>("SELECT id, name FROM package WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn resolve_package(&self, name: &str) -> MetadataResult<PackageRow> {
        if let Some(row) = self.get_package_by_name(name).await? {
            return Ok(row);
        }

        // A racing insert of the same name loses silently; the re-read sees the winner.
        sqlx::query("INSERT INTO package (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;

        self.get_package_by_name(name).await?.ok_or_else(|| {
            MetadataError::Internal(format!("package '{name}' missing after insert"))
        })
    }
}

#[async_trait]
impl StatisticRepo for PostgresStore {
    async fn list_statistics(&self, package_id: i64) -> MetadataResult<Vec<StatisticRow>> {
        let rows = sqlx::query_as::<_, StatisticRow>(
            "SELECT package_id, day, downloads FROM statistic WHERE package_id = $1 ORDER BY day",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_statistics(
        &self,
        package_id: i64,
        statistics: &[DailyStatistic],
    ) -> MetadataResult<u64> {
        if statistics.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for batch in statistics.chunks(MAX_ROWS_PER_INSERT) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO statistic (package_id, day, downloads) ");
            builder.push_values(batch, |mut row, stat| {
                row.push_bind(package_id)
                    .push_bind(stat.day)
                    .push_bind(stat.downloads);
            });
            builder.push(" ON CONFLICT (package_id, day) DO NOTHING");
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        Ok(inserted)
    }

    async fn average_downloads(&self, start: Date, end: Date) -> MetadataResult<Vec<AverageRow>> {
        let rows = sqlx::query_as::<_, AverageRow>(
            r#"
            SELECT name, FLOOR(AVG(downloads))::BIGINT AS average
            FROM package_statistic
            WHERE day >= $1 AND day < $2 AND downloads <> -1
            GROUP BY name
            ORDER BY name COLLATE "C"
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
