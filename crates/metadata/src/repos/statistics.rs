//! Daily statistic repository.

use crate::error::MetadataResult;
use crate::models::{AverageRow, StatisticRow};
use async_trait::async_trait;
use tally_core::DailyStatistic;
use time::Date;

/// Rows per INSERT statement; keeps bind counts under backend limits.
pub const MAX_ROWS_PER_INSERT: usize = 5000;

/// Repository for per-day statistics.
#[async_trait]
pub trait StatisticRepo: Send + Sync {
    /// All statistics of a package, ascending by day.
    async fn list_statistics(&self, package_id: i64) -> MetadataResult<Vec<StatisticRow>>;

    /// Insert statistics for a package in one transaction.
    ///
    /// Days already stored are left untouched. Returns the number of rows inserted.
    async fn insert_statistics(
        &self,
        package_id: i64,
        statistics: &[DailyStatistic],
    ) -> MetadataResult<u64>;

    /// Integer average downloads per package name over `[start, end)`,
    /// ignoring unavailable days, ordered by name.
    async fn average_downloads(&self, start: Date, end: Date) -> MetadataResult<Vec<AverageRow>>;
}
