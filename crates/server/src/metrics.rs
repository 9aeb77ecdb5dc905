//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the rotaproxy server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Proxy pool capacity (collected dynamically)
//! - Core dispatcher and replenisher metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use rotaproxy_core::ProxyEndpoint;

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
            "rotaproxy_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rotaproxy_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "rotaproxy_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Proxy Pool Metrics (collected dynamically)
// =============================================================================

/// Available request slots by proxy.
pub static PROXY_AVAILABLE_SLOTS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "rotaproxy_proxy_available_slots",
            "Request slots currently available per proxy",
        ),
        &["proxy"],
    )
    .unwrap()
});

/// Configured pool size.
pub static PROXY_POOL_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("rotaproxy_proxy_pool_size", "Number of proxies in the pool").unwrap()
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

    // Proxy pool
    registry
        .register(Box::new(PROXY_AVAILABLE_SLOTS.clone()))
        .unwrap();
    registry
        .register(Box::new(PROXY_POOL_SIZE.clone()))
        .unwrap();

    // Core metrics (dispatcher, replenisher)
    for metric in rotaproxy_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current
/// proxy capacity.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let dispatcher = state.dispatcher();
    PROXY_POOL_SIZE.set(dispatcher.len() as i64);
    for proxy in dispatcher.proxies() {
        PROXY_AVAILABLE_SLOTS
            .with_label_values(&[proxy.name()])
            .set(i64::from(proxy.gate().available()));
    }
}
