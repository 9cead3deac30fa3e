//! Per-package download history.
//!
//! Every request runs one reconciliation step before answering, so the
//! returned history may grow between consecutive calls.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use tally_core::{DailyStatistic, GLOBAL_PACKAGE};

async fn downloads_for(state: &AppState, name: &str) -> ApiResult<Json<Vec<DailyStatistic>>> {
    let policy = state.config.policy.for_package(name);
    let statistics = state.fetcher.get_package_statistics(name, policy).await?;
    Ok(Json(statistics))
}

/// GET /packages/{package}/downloads
pub async fn get_package_downloads(
    State(state): State<AppState>,
    Path(package): Path<String>,
) -> ApiResult<Json<Vec<DailyStatistic>>> {
    downloads_for(&state, &package).await
}

/// GET /packages/{scope}/{name}/downloads
///
/// Scoped names may arrive with their slash unencoded.
pub async fn get_scoped_package_downloads(
    State(state): State<AppState>,
    Path((scope, name)): Path<(String, String)>,
) -> ApiResult<Json<Vec<DailyStatistic>>> {
    if !scope.starts_with('@') {
        return Err(ApiError::NotFound(format!("{scope}/{name}")));
    }
    downloads_for(&state, &format!("{scope}/{name}")).await
}

/// GET /packages//downloads - the all-packages aggregate.
pub async fn get_global_downloads(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DailyStatistic>>> {
    downloads_for(&state, GLOBAL_PACKAGE).await
}
