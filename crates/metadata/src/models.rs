//! Database models mapping to the statistics schema.

use sqlx::FromRow;
use tally_core::DailyStatistic;
use time::Date;

/// Package registry record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PackageRow {
    pub id: i64,
    /// Unique name; empty for the all-packages aggregate.
    pub name: String,
}

/// One day of downloads for one package.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StatisticRow {
    pub package_id: i64,
    pub day: Date,
    /// Download count, or -1 when unavailable upstream.
    pub downloads: i64,
}

impl From<StatisticRow> for DailyStatistic {
    fn from(row: StatisticRow) -> Self {
        DailyStatistic::new(row.day, row.downloads)
    }
}

/// Average downloads of one package over a window.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AverageRow {
    pub name: String,
    pub average: i64,
}
