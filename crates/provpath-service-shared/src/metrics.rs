//! Prometheus metrics for provpath services.
//!
//! - [`MetricsConfig`]: whether metrics are on and where they are served
//! - [`init_metrics`]: install the Prometheus recorder
//! - [`metrics_handler`]: axum handler rendering the exposition text
//! - business helpers for path lookups and route enrichment
//!
//! ```no_run
//! use provpath_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! init_metrics(&MetricsConfig::default()).expect("failed to initialize metrics");
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use provpath_lib::{Error as LibError, PathResult};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the exposition text.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` (anything but "false" enables) and `METRICS_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("METRICS_ENABLED")
            .map(|v| v.trim().to_lowercase() != "false")
            .unwrap_or(true);
        let path = lookup("METRICS_PATH")
            .filter(|v| v.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder. Only the first call succeeds.
///
/// # Errors
///
/// Fails when metrics are disabled, when a recorder is already installed, or
/// when the exporter cannot be built.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Returns `None` until [`init_metrics`] has succeeded.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Label value for `provpath_paths_failed_total{reason}`.
pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::RegionNotFound { .. } => "unknown_region",
        LibError::NoPathFound { .. } => "no_path",
        LibError::InvalidInput { .. } => "invalid_input",
        e if e.is_precondition() => "not_ready",
        _ => "internal",
    }
}

/// Count a successful lookup and record its hop count.
pub fn record_path_found(result: &PathResult) {
    metrics::counter!(
        "provpath_paths_found_total",
        "road_class" => result.road_class.as_str()
    )
    .increment(1);

    metrics::histogram!("provpath_path_hops").record(result.hop_count() as f64);

    let outcome = if result.real_distance_km.is_some() {
        "resolved"
    } else {
        "absent"
    };
    record_route_enrichment(outcome);
}

/// Count a failed lookup, labelled by [`failure_reason`].
pub fn record_path_failed(error: &LibError) {
    metrics::counter!(
        "provpath_paths_failed_total",
        "reason" => failure_reason(error)
    )
    .increment(1);
}

/// Count a lookup refused before reaching the orchestrator.
pub fn record_path_rejected() {
    metrics::counter!("provpath_paths_failed_total", "reason" => "validation_error").increment(1);
}

/// Count one external route enrichment outcome ("resolved" or "absent").
pub fn record_route_enrichment(outcome: &'static str) {
    metrics::counter!("provpath_route_enrichment_total", "outcome" => outcome).increment(1);
}

/// Record how many regions a listing, search or reachability query returned.
pub fn record_regions_returned(count: usize, query_type: &'static str) {
    metrics::histogram!("provpath_regions_returned", "query_type" => query_type)
        .record(count as f64);
}
