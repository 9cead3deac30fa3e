//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// GET routes answer HEAD as well, with the body stripped.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/packages/averages", get(handlers::get_averages))
        // The aggregate is stored under the empty name, which leaves an empty segment.
        .route("/packages//downloads", get(handlers::get_global_downloads))
        .route(
            "/packages/{package}/downloads",
            get(handlers::get_package_downloads),
        )
        .route(
            "/packages/{package}/{name}/downloads",
            get(handlers::get_scoped_package_downloads),
        );

    let mut router = Router::new().merge(api_routes);

    // SECURITY: /metrics is unauthenticated; restrict it at the network level.
    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
