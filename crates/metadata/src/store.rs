//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{AverageRow, PackageRow, StatisticRow};
use crate::repos::statistics::MAX_ROWS_PER_INSERT;
use crate::repos::{PackageRepo, StatisticRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tally_core::DailyStatistic;
use time::Date;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: PackageRepo + StatisticRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) a SQLite store. `":memory:"` opens a private in-memory database.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        let opts = if path == Path::new(":memory:") {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        };
        let opts = opts
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers; an in-memory database
            // also lives only as long as its connection, so never recycle it.
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "SQLite metadata store opened");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PackageRepo for SqliteStore {
    async fn get_package_by_name(&self, name: &str) -> MetadataResult<Option<PackageRow>> {
        let row = sqlx::query_as::<_, PackageRow>("SELECT id, name FROM package WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn resolve_package(&self, name: &str) -> MetadataResult<PackageRow> {
        if let Some(row) = self.get_package_by_name(name).await? {
            return Ok(row);
        }

        sqlx::query("INSERT INTO package (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;

        self.get_package_by_name(name).await?.ok_or_else(|| {
            MetadataError::Internal(format!("package '{name}' missing after insert"))
        })
    }
}

#[async_trait]
impl StatisticRepo for SqliteStore {
    async fn list_statistics(&self, package_id: i64) -> MetadataResult<Vec<StatisticRow>> {
        let rows = sqlx::query_as::<_, StatisticRow>(
            "SELECT package_id, day, downloads FROM statistic WHERE package_id = ? ORDER BY day",
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
            let mut builder: QueryBuilder<Sqlite> =
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
            SELECT name, CAST(AVG(downloads) AS INTEGER) AS average
            FROM package_statistic
            WHERE day >= ? AND day < ? AND downloads <> -1
            GROUP BY name
            ORDER BY name
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS package (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS statistic (
    package_id INTEGER NOT NULL REFERENCES package(id),
    day TEXT NOT NULL,
    downloads INTEGER NOT NULL,
    UNIQUE (package_id, day)
);
CREATE INDEX IF NOT EXISTS idx_statistic_day ON statistic(day);

CREATE VIEW IF NOT EXISTS package_statistic AS
SELECT package.name AS name, statistic.day AS day, statistic.downloads AS downloads
FROM statistic
JOIN package ON package.id = statistic.package_id;
"#;
