//! Statistics source trait.

use crate::error::UpstreamResult;
use async_trait::async_trait;
use tally_core::{FetchRange, RangeResponse};

/// A provider of per-day download counts.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch downloads of `package` for every day of `range`.
    ///
    /// The empty package name asks for the all-packages aggregate. An error
    /// reported in the response body is returned in `RangeResponse::error`
    /// rather than as `Err`.
    async fn fetch_range(&self, package: &str, range: FetchRange)
    -> UpstreamResult<RangeResponse>;
}
