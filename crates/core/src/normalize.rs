//! Normalization of sparse upstream responses into dense day sequences.

use crate::day::{DailyStatistic, FetchRange};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use time::Date;

/// Message prefix the upstream uses when it has no data for a range.
pub const NO_DATA_PREFIX: &str = "no stats for";

/// Error code the upstream appends to its "no data" message.
pub const NO_DATA_CODE: &str = "(0008)";

/// Raw upstream answer for one range request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeResponse {
    /// Reported downloads per day. Days may be missing.
    pub downloads: BTreeMap<Date, i64>,
    /// Error reported by the upstream, if any.
    pub error: Option<String>,
}

impl RangeResponse {
    pub fn with_downloads(downloads: impl IntoIterator<Item = (Date, i64)>) -> Self {
        Self {
            downloads: downloads.into_iter().collect(),
            error: None,
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            downloads: BTreeMap::new(),
            error: Some(error.into()),
        }
    }
}

/// Whether an upstream error message means "no data for this range".
pub fn is_no_data_error(message: &str) -> bool {
    let message = message.trim();
    message.starts_with(NO_DATA_PREFIX) || message.ends_with(NO_DATA_CODE)
}

/// Densify an upstream response into one record per day of `range`.
///
/// A "no data" error yields unavailable records for the whole range; any other
/// error fails the call. Days missing from a successful response count as zero.
pub fn normalize(response: &RangeResponse, range: FetchRange) -> Result<Vec<DailyStatistic>> {
    if let Some(message) = response.error.as_deref() {
        if is_no_data_error(message) {
            return Ok(range.iter_days().map(DailyStatistic::unavailable).collect());
        }
        return Err(Error::Upstream(message.to_string()));
    }

    Ok(range
        .iter_days()
        .map(|day| {
            let downloads = response.downloads.get(&day).copied().unwrap_or(0);
            DailyStatistic::new(day, downloads)
        })
        .collect())
}
