//! Fetch orchestration.
//!
//! One call to [`StatsFetcher::get_package_statistics`] advances a package's
//! cached history by at most one upstream range. Clients that keep asking
//! converge on a complete history; nobody waits for a full backfill.

use crate::error::ApiResult;
use crate::metrics;
use std::collections::BTreeMap;
use std::sync::Arc;
use tally_core::{
    Clock, DailyStatistic, RangeDecision, RangePolicy, decide_next_range, normalize,
    validate_package_name,
};
use tally_metadata::MetadataStore;
use tally_metadata::repos::{PackageRepo, StatisticRepo};
use tally_upstream::StatsSource;
use time::Date;

/// Ties the reconciler, the upstream source and the metadata store together.
pub struct StatsFetcher {
    metadata: Arc<dyn MetadataStore>,
    upstream: Arc<dyn StatsSource>,
    clock: Arc<dyn Clock>,
}

impl StatsFetcher {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        upstream: Arc<dyn StatsSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            metadata,
            upstream,
            clock,
        }
    }

    /// Return the stored history of `name` after one reconciliation step,
    /// ascending by day.
    ///
    /// Upstream or normalization failures abort before anything is written,
    /// so a failed call leaves the store as it was (apart from the package row).
    pub async fn get_package_statistics(
        &self,
        name: &str,
        policy: RangePolicy,
    ) -> ApiResult<Vec<DailyStatistic>> {
        validate_package_name(name)?;

        let package = self.metadata.resolve_package(name).await?;
        let mut statistics: Vec<DailyStatistic> = self
            .metadata
            .list_statistics(package.id)
            .await?
            .into_iter()
            .map(DailyStatistic::from)
            .collect();

        let decision = decide_next_range(&statistics, policy, self.clock.now_utc());
        metrics::RANGE_DECISIONS
            .with_label_values(&[decision.direction()])
            .inc();

        let range = match decision {
            RangeDecision::Forward(range) | RangeDecision::Backward(range) => range,
            RangeDecision::Exhausted => {
                tracing::debug!(package = %name, stored = statistics.len(), "History complete");
                return Ok(statistics);
            }
        };

        tracing::info!(
            package = %name,
            direction = decision.direction(),
            start = %range.start,
            end = %range.end,
            "Fetching upstream range"
        );

        let timer = metrics::UPSTREAM_REQUEST_DURATION.start_timer();
        let response = self.upstream.fetch_range(name, range).await;
        timer.observe_duration();

        let response = response.inspect_err(|e| {
            metrics::record_upstream_request("error");
            tracing::warn!(package = %name, range = %range, error = %e, "Upstream request failed");
        })?;
        let fetched = normalize(&response, range).inspect_err(|e| {
            metrics::record_upstream_request("rejected");
            tracing::warn!(package = %name, range = %range, error = %e, "Upstream reported an error");
        })?;
        metrics::record_upstream_request(if response.error.is_some() {
            "no_data"
        } else {
            "ok"
        });

        let inserted = self
            .metadata
            .insert_statistics(package.id, &fetched)
            .await?;
        metrics::STATISTICS_STORED.inc_by(inserted);
        tracing::debug!(package = %name, fetched = fetched.len(), inserted, "Statistics stored");

        // A concurrent request may have stored some of these days already;
        // keep one record per day either way.
        statistics.extend(fetched);
        statistics.sort_by_key(|stat| stat.day);
        statistics.dedup_by_key(|stat| stat.day);
        Ok(statistics)
    }

    /// Integer average of the available downloads per package name over
    /// `[start, end)`. Names without available days are absent.
    pub async fn query_average_downloads(
        &self,
        start: Date,
        end: Date,
    ) -> ApiResult<BTreeMap<String, i64>> {
        let rows = self.metadata.average_downloads(start, end).await?;
        Ok(rows.into_iter().map(|row| (row.name, row.average)).collect())
    }
}
