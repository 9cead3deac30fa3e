//! Range reconciliation.
//!
//! Given the stored history of a package, decide the single next range of
//! days to request from the upstream. Forward gaps toward the present win
//! over backfilling toward the past; backfilling stops once a long enough
//! run of unavailable days has been seen at the front of the history.

use crate::day::{DailyStatistic, EPOCH, FetchRange, add_days, days_between};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

/// Leading unavailable days after which backfilling is abandoned.
pub const BACKLOG_EXHAUSTION_DAYS: usize = 180;

/// UTC hour before which yesterday's numbers are not trusted to be published.
pub const PUBLICATION_HOUR_UTC: u8 = 6;

/// Sizing policy for one class of requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePolicy {
    /// Smallest forward gap (in days) worth a forward request.
    pub min_gap_days: u32,
    /// Largest number of days requested at once.
    pub max_span_days: u32,
}

impl RangePolicy {
    pub const fn new(min_gap_days: u32, max_span_days: u32) -> Self {
        Self {
            min_gap_days,
            max_span_days,
        }
    }

    /// Validate policy invariants.
    pub fn validate(&self) -> Result<()> {
        if self.min_gap_days == 0 {
            return Err(Error::Config("min_gap_days must be at least 1".to_string()));
        }
        if self.max_span_days == 0 {
            return Err(Error::Config("max_span_days must be at least 1".to_string()));
        }
        if self.min_gap_days > self.max_span_days {
            return Err(Error::Config(format!(
                "min_gap_days ({}) must not exceed max_span_days ({})",
                self.min_gap_days, self.max_span_days
            )));
        }
        Ok(())
    }
}

/// Outcome of reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeDecision {
    /// Extend history toward the present.
    Forward(FetchRange),
    /// Extend history toward the past.
    Backward(FetchRange),
    /// Nothing left worth requesting.
    Exhausted,
}

impl RangeDecision {
    /// The range to fetch, if any.
    pub fn range(&self) -> Option<FetchRange> {
        match self {
            Self::Forward(range) | Self::Backward(range) => Some(*range),
            Self::Exhausted => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn direction(&self) -> &'static str {
        match self {
            Self::Forward(_) => "forward",
            Self::Backward(_) => "backward",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Latest day the upstream is expected to have published at `now`.
///
/// Today is never available; before 06:00 UTC yesterday is not trusted either.
pub fn fetch_horizon(now: OffsetDateTime) -> Date {
    let now = now.to_offset(UtcOffset::UTC);
    let lag = if now.hour() < PUBLICATION_HOUR_UTC { 2 } else { 1 };
    add_days(now.date(), -lag)
}

/// Count consecutive unavailable records at the front of `existing`.
pub fn missing_prefix_len(existing: &[DailyStatistic]) -> usize {
    existing
        .iter()
        .take_while(|stat| stat.is_unavailable())
        .count()
}

/// Decide the next range to request for a package.
///
/// `existing` must be sorted ascending by day.
pub fn decide_next_range(
    existing: &[DailyStatistic],
    policy: RangePolicy,
    now: OffsetDateTime,
) -> RangeDecision {
    let horizon = fetch_horizon(now);
    let max_span = i64::from(policy.max_span_days.max(1));
    let latest = existing.last().map_or(EPOCH, |stat| stat.day);

    if existing.is_empty() || days_between(latest, horizon) >= i64::from(policy.min_gap_days) {
        let start = add_days(latest, 1);
        let end = add_days(start, max_span - 1).min(horizon);
        if start <= end {
            return RangeDecision::Forward(FetchRange { start, end });
        }
        // Only reachable with an empty history and a horizon before the epoch.
        return RangeDecision::Exhausted;
    }

    if missing_prefix_len(existing) > BACKLOG_EXHAUSTION_DAYS {
        return RangeDecision::Exhausted;
    }

    let earliest = existing[0].day;
    let end = add_days(earliest, -1);
    let start = add_days(end, -(max_span - 1));
    RangeDecision::Backward(FetchRange { start, end })
}
