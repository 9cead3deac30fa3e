//! Prometheus metrics for the tally server.
//!
//! Exposes counters for range decisions, upstream requests and stored rows,
//! plus upstream latency. Labels never carry package names, so cardinality
//! stays fixed regardless of traffic.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static RANGE_DECISIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tally_range_decisions_total",
            "Range reconciliation outcomes by direction",
        ),
        &["direction"],
    )
    .expect("metric creation failed")
});

pub static UPSTREAM_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tally_upstream_requests_total",
            "Upstream range requests by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static STATISTICS_STORED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "tally_statistics_stored_total",
        "Daily statistic rows newly written to the metadata store",
    )
    .expect("metric creation failed")
});

pub static UPSTREAM_REQUEST_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "tally_upstream_request_duration_seconds",
            "Time taken by a single upstream range request",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so integration tests may build many routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(RANGE_DECISIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPSTREAM_REQUESTS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(STATISTICS_STORED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPSTREAM_REQUEST_DURATION.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Helper to record an upstream request outcome.
pub fn record_upstream_request(outcome: &str) {
    UPSTREAM_REQUESTS.with_label_values(&[outcome]).inc();
}
