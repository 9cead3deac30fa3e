//! Test fixtures.

use std::sync::Arc;
use tally_core::DailyStatistic;
use tally_core::day::add_days;
use tally_metadata::MetadataStore;
use tally_metadata::repos::{PackageRepo, StatisticRepo};
use time::macros::datetime;
use time::{Date, OffsetDateTime};

/// "Now" for every fixed-clock test: the horizon is 2024-03-09.
#[allow(dead_code)]
pub const NOW: OffsetDateTime = datetime!(2024-03-10 12:00 UTC);

/// `len` consecutive days from `start`, all with `downloads`.
#[allow(dead_code)]
pub fn run_of(start: Date, len: usize, downloads: i64) -> Vec<DailyStatistic> {
    (0..len)
        .map(|offset| DailyStatistic::new(add_days(start, offset as i64), downloads))
        .collect()
}

/// Consecutive days from `start` with the given values.
#[allow(dead_code)]
pub fn days_from(start: Date, values: &[i64]) -> Vec<DailyStatistic> {
    values
        .iter()
        .enumerate()
        .map(|(offset, downloads)| DailyStatistic::new(add_days(start, offset as i64), *downloads))
        .collect()
}

/// Create `name` and store `statistics` for it, returning its id.
#[allow(dead_code)]
pub async fn seed(
    metadata: &Arc<dyn MetadataStore>,
    name: &str,
    statistics: &[DailyStatistic],
) -> i64 {
    let package = metadata
        .resolve_package(name)
        .await
        .expect("Failed to resolve package");
    metadata
        .insert_statistics(package.id, statistics)
        .await
        .expect("Failed to seed statistics");
    package.id
}

/// Stored history of `name`, ascending by day.
#[allow(dead_code)]
pub async fn stored(metadata: &Arc<dyn MetadataStore>, name: &str) -> Vec<DailyStatistic> {
    let Some(package) = metadata
        .get_package_by_name(name)
        .await
        .expect("Failed to look up package")
    else {
        return Vec::new();
    };
    metadata
        .list_statistics(package.id)
        .await
        .expect("Failed to list statistics")
        .into_iter()
        .map(DailyStatistic::from)
        .collect()
}
