// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the QuorumDB operator.
//!
//! This module provides metrics collection with the namespace prefix
//! `quorumdb_io_` (prometheus-safe version of "quorumdb.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliation operations and their outcomes
//! - **Leader Election Metrics** - Track leadership state changes per domain
//! - **Supervision Metrics** - Track readiness gate retries and maintenance mode
//! - **Resource Metrics** - Track the live worker registries
//!
//! # Example
//!
//! ```rust,no_run
//! use quorumdb_operator::metrics::{record_reconciliation_success, METRICS_REGISTRY};
//!
//! // Record a successful reconciliation
//! record_reconciliation_success("QuorumCluster", std::time::Duration::from_secs(1));
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all operator metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "quorumdb_io";

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via the `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (e.g., `QuorumCluster`)
/// - `status`: Outcome (`success`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `resource_type`: Kind of resource
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of errors by resource type and error category
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `error_type`: Category of error (`reconcile`, `api_error`, `store_error`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by resource type and error category",
    );
    let counter = CounterVec::new(opts, &["resource_type", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Leader Election Metrics
// ============================================================================

/// Total number of leader election events
///
/// Labels:
/// - `domain`: Reconciliation domain
/// - `status`: Event type (`acquired`, `lost`)
pub static LEADER_ELECTIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_leader_elections_total"),
        "Total number of leader election events by domain and status",
    );
    let counter = CounterVec::new(opts, &["domain", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Current leader election status per domain
///
/// Labels:
/// - `domain`: Reconciliation domain
///
/// Value: 1 if this replica leads the domain, 0 otherwise
pub static LEADER_STATUS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_leader_status"),
        "Current leader election status per domain (1 = leader, 0 = follower)",
    );
    let gauge = GaugeVec::new(opts, &["domain"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Supervision Metrics
// ============================================================================

/// Total number of readiness gate retries per domain
pub static READINESS_RETRIES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_readiness_retries_total"),
        "Total number of prerequisite readiness retries per domain",
    );
    let counter = CounterVec::new(opts, &["domain"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Last observed cluster-wide maintenance mode (1 = enabled, 0 = disabled)
pub static MAINTENANCE_MODE: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_maintenance_mode"),
        "Last observed cluster-wide maintenance mode (1 = enabled, 0 = disabled)",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Resource Metrics
// ============================================================================

/// Number of live worker instances per resource kind
pub static RESOURCES_ACTIVE: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_active"),
        "Number of live reconciler worker instances by resource type",
    );
    let gauge = GaugeVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Recording Helpers
// ============================================================================

/// Record a successful reconciliation with its duration.
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation.
pub fn record_reconciliation_error(resource_type: &str, error_type: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_type])
        .inc();
}

/// Record leadership acquisition for a domain.
pub fn record_leader_elected(domain: &str) {
    LEADER_ELECTIONS_TOTAL
        .with_label_values(&[domain, "acquired"])
        .inc();
    LEADER_STATUS.with_label_values(&[domain]).set(1.0);
}

/// Record leadership loss for a domain.
pub fn record_leader_lost(domain: &str) {
    LEADER_ELECTIONS_TOTAL
        .with_label_values(&[domain, "lost"])
        .inc();
    LEADER_STATUS.with_label_values(&[domain]).set(0.0);
}

/// Record one readiness gate retry for a domain.
pub fn record_readiness_retry(domain: &str) {
    READINESS_RETRIES_TOTAL.with_label_values(&[domain]).inc();
}

/// Record the observed cluster-wide maintenance mode.
pub fn record_maintenance_mode(enabled: bool) {
    MAINTENANCE_MODE.set(if enabled { 1.0 } else { 0.0 });
}

/// Record the current size of a worker registry.
pub fn set_resources_active(resource_type: &str, count: usize) {
    #[allow(clippy::cast_precision_loss)]
    RESOURCES_ACTIVE
        .with_label_values(&[resource_type])
        .set(count as f64);
}

/// Render all registered metrics in the Prometheus text exposition format.
#[must_use]
pub fn export_metrics() -> String {
    let encoder = TextEncoder::new();
    let families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_contains_registered_metrics() {
        record_reconciliation_success("QuorumCluster", Duration::from_millis(12));
        record_leader_elected("cluster");
        record_maintenance_mode(true);

        let text = export_metrics();
        assert!(text.contains("quorumdb_io_reconciliations_total"));
        assert!(text.contains("quorumdb_io_leader_status"));
        assert!(text.contains("quorumdb_io_maintenance_mode"));
    }

    #[test]
    fn test_leader_status_flips_with_leadership() {
        record_leader_elected("storage");
        assert_eq!(LEADER_STATUS.with_label_values(&["storage"]).get(), 1.0);

        record_leader_lost("storage");
        assert_eq!(LEADER_STATUS.with_label_values(&["storage"]).get(), 0.0);
    }

    #[test]
    fn test_resources_active_tracks_registry_size() {
        set_resources_active("QuorumReplication", 3);
        assert_eq!(
            RESOURCES_ACTIVE
                .with_label_values(&["QuorumReplication"])
                .get(),
            3.0
        );
    }
}
