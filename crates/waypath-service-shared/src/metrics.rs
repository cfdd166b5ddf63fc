//! Prometheus metrics for the waypath services.
//!
//! Call [`init_metrics`] once at startup and mount [`metrics_handler`] on
//! `/metrics`. The `record_*` helpers are no-ops until a recorder is
//! installed, so handlers can call them unconditionally.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use waypath_service_shared::metrics::{init_metrics, metrics_handler, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default()).expect("failed to initialize metrics");
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use waypath_lib::RouteMode;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// `METRICS_ENABLED`: "false" turns metrics off (default: true).
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);
        Self { enabled }
    }
}

/// Install the Prometheus recorder.
///
/// # Errors
///
/// Fails when metrics are disabled, when a recorder is already installed, or
/// when the exporter cannot be built.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// `GET /metrics` in Prometheus exposition format.
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
// Routing metrics
// =============================================================================

/// Increment `waypath_routes_calculated_total{mode}`.
pub fn record_route_calculated(mode: RouteMode) {
    metrics::counter!("waypath_routes_calculated_total", "mode" => mode.as_str()).increment(1);
}

/// Increment `waypath_routes_failed_total{reason}`.
///
/// `reason` is one of `invalid_endpoint`, `no_path`, `malformed_graph`,
/// `graph_unavailable` or `validation_error`.
pub fn record_route_failed(reason: &'static str) {
    metrics::counter!("waypath_routes_failed_total", "reason" => reason).increment(1);
}

/// Record the node count of a returned path in `waypath_route_path_nodes{mode}`.
pub fn record_route_path_nodes(mode: RouteMode, nodes: usize) {
    metrics::histogram!("waypath_route_path_nodes", "mode" => mode.as_str()).record(nodes as f64);
}

/// Increment `waypath_snaps_total{outcome}` (`snapped` or `out_of_range`).
pub fn record_snap(outcome: &'static str) {
    metrics::counter!("waypath_snaps_total", "outcome" => outcome).increment(1);
}

/// Metric label for a failed library call.
pub fn failure_reason(error: &waypath_lib::Error) -> &'static str {
    use waypath_lib::Error;

    match error {
        Error::InvalidEndpoint { .. } => "invalid_endpoint",
        Error::NoPathFound { .. } | Error::SearchLimitExceeded { .. } => "no_path",
        Error::MalformedGraph { .. } | Error::Json(_) | Error::EmptyGraph => "malformed_graph",
        Error::Io(_) | Error::Http(_) => "graph_unavailable",
        Error::UnknownMode { .. }
        | Error::InvalidParameters { .. }
        | Error::SnapOutOfRange { .. } => "validation_error",
    }
}
