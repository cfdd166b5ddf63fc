//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "ok": graphs load lazily, so an empty cache is still ready.
    pub status: String,

    pub service: String,

    pub version: String,

    /// RFC 3339 time the probe was answered.
    pub checked_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphs_cached: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_graph_loaded: Option<bool>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            checked_at: now_rfc3339(),
            graphs_cached: None,
            default_graph_loaded: None,
        }
    }

    pub fn ready(service: &str, version: &str, graphs_cached: usize, default_loaded: bool) -> Self {
        Self {
            graphs_cached: Some(graphs_cached),
            default_graph_loaded: Some(default_loaded),
            ..Self::alive(service, version)
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /health/live`
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`
///
/// ```text
/// {"status":"ok","service":"waypath-service-shared","version":"0.1.0",
///  "checked_at":"2026-01-01T00:00:00.000Z","graphs_cached":1,"default_graph_loaded":true}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let status = HealthStatus::ready(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        state.cached_graph_count(),
        state.has_default_graph(),
    );
    (StatusCode::OK, Json(status))
}
