// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the k8gb operator.
//!
//! Metrics live in a process-wide registry under the `k8gb_absa_oss_`
//! namespace. Exposition is left to the embedding process; the operator only
//! records.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all k8gb metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "k8gb_absa_oss";

/// Global Prometheus metrics registry.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of Gslb reconciliations by outcome.
///
/// Labels:
/// - `status`: Outcome (`success`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of Gslb reconciliations by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of Gslb reconciliations in seconds.
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of Gslb reconciliations in seconds",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Record a finished reconciliation.
pub fn record_reconciliation(status: &str, duration: Duration) {
    RECONCILIATION_TOTAL.with_label_values(&[status]).inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration.as_secs_f64());
}
