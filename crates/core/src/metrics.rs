//! Prometheus metrics for core components.
//!
//! Registered into the server's registry through [`all_metrics`].

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Trending cache
// =============================================================================

/// Trending refreshes by result.
pub static TRENDING_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "flickvault_trending_refreshes_total",
            "Total trending cache refreshes",
        ),
        &["result"], // "success", "upstream_error", "store_error"
    )
    .unwrap()
});

/// Trending refresh duration in seconds.
pub static TRENDING_REFRESH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "flickvault_trending_refresh_duration_seconds",
            "Duration of a trending cache refresh",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

/// Per-entry external id lookups by outcome.
pub static TRENDING_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "flickvault_trending_lookups_total",
            "Trending feed entries by reconciliation outcome",
        ),
        &["result"], // "matched", "missing", "failed"
    )
    .unwrap()
});

/// Requests served from a stale cache after a failed refresh.
pub static TRENDING_STALE_SERVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flickvault_trending_stale_served_total",
        "Trending requests answered with stale items after a failed refresh",
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TRENDING_REFRESHES.clone()),
        Box::new(TRENDING_REFRESH_DURATION.clone()),
        Box::new(TRENDING_LOOKUPS.clone()),
        Box::new(TRENDING_STALE_SERVED.clone()),
    ]
}
