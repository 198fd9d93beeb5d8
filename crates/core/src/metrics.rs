//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Searches recorded, by mode and outcome
//! - Offers synthesized per search
//! - Offer ranking requests

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Searches handled, by mode and result.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("travelpair_searches_total", "Total searches handled"),
        &["mode", "result"], // result: "ok", "invalid", "error"
    )
    .unwrap()
});

/// Offers synthesized per search.
pub static OFFERS_PER_SEARCH: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "travelpair_offers_per_search",
            "Number of offers synthesized per search",
        )
        .buckets(vec![0.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
        &["mode"],
    )
    .unwrap()
});

/// Providers queried per search.
pub static PROVIDERS_PER_SEARCH: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "travelpair_providers_per_search",
            "Number of active providers used per search",
        )
        .buckets(vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0]),
        &["mode"],
    )
    .unwrap()
});

// =============================================================================
// Ranking Metrics
// =============================================================================

/// Ranking requests by sort key.
pub static RANK_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "travelpair_rank_requests_total",
            "Total offer ranking requests",
        ),
        &["sort"], // "price", "duration", "departure", "none"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(OFFERS_PER_SEARCH.clone()),
        Box::new(PROVIDERS_PER_SEARCH.clone()),
        Box::new(RANK_REQUESTS.clone()),
    ]
}
