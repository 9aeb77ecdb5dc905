//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Dispatcher (selections, attempts per selection, exhaustion)
//! - Replenisher (capacity added per proxy)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Dispatcher Metrics
// =============================================================================

/// Successful selections by proxy.
pub static DISPATCH_SELECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rotaproxy_dispatch_selections_total",
            "Total successful proxy selections",
        ),
        &["proxy"],
    )
    .unwrap()
});

/// Candidates checked per successful selection.
pub static DISPATCH_ATTEMPTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "rotaproxy_dispatch_attempts",
            "Number of candidates checked per successful selection",
        )
        .buckets(vec![
            1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 100.0, 1_000.0, 10_000.0, 100_000.0,
        ]),
    )
    .unwrap()
});

/// Selections that gave up without finding capacity.
pub static DISPATCH_EXHAUSTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rotaproxy_dispatch_exhausted_total",
        "Total selections that hit their spin limit without capacity",
    )
    .unwrap()
});

// =============================================================================
// Replenisher Metrics
// =============================================================================

/// Capacity slots added by proxy.
pub static CAPACITY_REPLENISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rotaproxy_capacity_replenished_total",
            "Total capacity slots added back to proxies",
        ),
        &["proxy"],
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DISPATCH_SELECTIONS.clone()),
        Box::new(DISPATCH_ATTEMPTS.clone()),
        Box::new(DISPATCH_EXHAUSTED.clone()),
        Box::new(CAPACITY_REPLENISHED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        DISPATCH_SELECTIONS.with_label_values(&["test"]).inc();
        DISPATCH_ATTEMPTS.observe(1.0);
        DISPATCH_EXHAUSTED.inc();
        CAPACITY_REPLENISHED.with_label_values(&["test"]).inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"rotaproxy_dispatch_selections_total".to_string()));
        assert!(names.contains(&"rotaproxy_dispatch_attempts".to_string()));
        assert!(names.contains(&"rotaproxy_dispatch_exhausted_total".to_string()));
        assert!(names.contains(&"rotaproxy_capacity_replenished_total".to_string()));
    }
}
