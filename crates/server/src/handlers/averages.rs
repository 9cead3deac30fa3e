//! Average downloads per package over a window.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use std::collections::BTreeMap;
use tally_core::day::{add_days, serde_day};
use time::Date;

/// Window length used when `start` is omitted.
pub const DEFAULT_WINDOW_DAYS: i64 = 60;

/// Query parameters for the averages endpoint. Both bounds are `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct AveragesQuery {
    /// Inclusive lower bound; defaults to `end - 60 days`.
    #[serde(default, with = "serde_day::option")]
    pub start: Option<Date>,
    /// Exclusive upper bound; defaults to today (UTC).
    #[serde(default, with = "serde_day::option")]
    pub end: Option<Date>,
}

/// GET /packages/averages?start=&end=
pub async fn get_averages(
    State(state): State<AppState>,
    Query(query): Query<AveragesQuery>,
) -> ApiResult<Json<BTreeMap<String, i64>>> {
    let end = query.end.unwrap_or_else(|| state.clock.now_utc().date());
    let start = query
        .start
        .unwrap_or_else(|| add_days(end, -DEFAULT_WINDOW_DAYS));
    if start > end {
        return Err(ApiError::BadRequest(format!(
            "start ({start}) is after end ({end})"
        )));
    }

    let averages = state.fetcher.query_average_downloads(start, end).await?;
    Ok(Json(averages))
}
