//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the TravelPair server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Search and provider totals (collected dynamically)
//! - Core search and ranking metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

use travelpair_core::{Mode, ProviderFilter};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "travelpair_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// Total HTTP requests.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("travelpair_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently being served.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "travelpair_http_requests_in_flight",
        "HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Storage Gauges
// =============================================================================

/// Active providers by mode.
pub static ACTIVE_PROVIDERS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("travelpair_active_providers", "Active providers by mode"),
        &["mode"],
    )
    .unwrap()
});

/// Recorded searches.
pub static RECORDED_SEARCHES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("travelpair_recorded_searches", "Searches recorded in storage").unwrap()
});

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Storage
    registry
        .register(Box::new(ACTIVE_PROVIDERS.clone()))
        .unwrap();
    registry
        .register(Box::new(RECORDED_SEARCHES.clone()))
        .unwrap();

    // Core metrics (searches, ranking)
    for metric in travelpair_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gauges from current application state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    for mode in [Mode::Flight, Mode::Train] {
        let filter = ProviderFilter::active().with_mode(mode);
        if let Ok(providers) = state.provider_store().list(&filter) {
            ACTIVE_PROVIDERS
                .with_label_values(&[mode.as_str()])
                .set(providers.len() as i64);
        }
    }

    if let Ok(count) = state.service().search_count() {
        RECORDED_SEARCHES.set(count);
    }
}

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_RE.replace_all(path, "{id}");
    let result = NUMERIC_RE.replace_all(&result, "/{id}$1");
    result.to_string()
}
