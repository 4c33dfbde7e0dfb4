//! Liveness and readiness probe handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Body returned by `/health/live` and `/health/ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// RFC 3339 time at which the probe ran.
    pub checked_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions_loaded: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_built: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_enabled: Option<bool>,
}

impl HealthStatus {
    fn base(status: String, service: &str, version: &str) -> Self {
        Self {
            status,
            service: service.to_string(),
            version: version.to_string(),
            checked_at: chrono::Utc::now().to_rfc3339(),
            regions_loaded: None,
            graph_built: None,
            routing_enabled: None,
        }
    }

    pub fn alive(service: &str, version: &str) -> Self {
        Self::base("ok".to_string(), service, version)
    }

    pub fn ready(service: &str, version: &str, state: &AppState) -> Self {
        Self {
            regions_loaded: Some(state.region_count()),
            graph_built: Some(state.graph_built()),
            routing_enabled: Some(state.service().has_resolver()),
            ..Self::base("ok".to_string(), service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self::base(format!("not_ready: {}", reason), service, version)
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"provpath-service-shared","version":"0.1.0","checked_at":"..."}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Ready once the registry holds regions and the graph is built.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    if state.region_count() == 0 {
        let status = HealthStatus::not_ready(service, version, "no regions loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }
    if !state.graph_built() {
        let status = HealthStatus::not_ready(service, version, "region graph not built");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, &state);
    (StatusCode::OK, Json(status)).into_response()
}
