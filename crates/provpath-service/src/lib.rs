//! HTTP routes for the provpath service.
//!
//! # Endpoints
//!
//! - `POST /api/v1/path/find` - shortest path between two regions
//! - `POST /api/v1/path/reachable` - regions reachable within a hop limit
//! - `POST /api/v1/path/connectivity` - whether two regions are connected
//! - `GET /api/v1/regions` - every region, sorted by code
//! - `GET /api/v1/regions/{identifier}` - one region and its neighbors
//! - `POST /api/v1/regions/search` - substring search on names
//! - `POST /api/v1/regions/validate` - check an identifier without failing
//! - `GET /api/v1/stats` - graph statistics and connectivity
//! - `GET /metrics`, `GET /health/live`, `GET /health/ready`

use axum::{
    Json, Router,
    extract::{Path, State},
    http::Method,
    routing::{get, post},
};
use serde::Serialize;
use tokio::task;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use provpath_lib::{
    ConnectivityReport, IdentifierValidation, PathResult, ReachableRegion, RegionInfo,
    RegionSummary, ServiceStats,
};
use provpath_service_shared::{
    AppState, ConnectivityRequest, FindPathRequest, MetricsLayer, ProblemDetails,
    ReachableRequest, RequestId, SearchRequest, ServiceResponse, Validate, ValidateRequest,
    from_lib_error, health_live, health_ready, metrics_handler, record_path_failed,
    record_path_found, record_path_rejected, record_regions_returned,
};

type ApiResult<T> = Result<ServiceResponse<T>, ProblemDetails>;

/// Path lookup body: the hop count next to the full result.
#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub hop_count: usize,
    #[serde(flatten)]
    pub result: PathResult,
}

#[derive(Debug, Serialize)]
pub struct ReachableResponse {
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<usize>,
    pub count: usize,
    pub regions: Vec<ReachableRegion>,
}

#[derive(Debug, Serialize)]
pub struct RegionListResponse {
    pub count: usize,
    pub regions: Vec<RegionSummary>,
}

/// Build the router with every endpoint, the metrics layer, and permissive
/// CORS for GET/POST.
pub fn app(state: AppState, metrics_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/path/find", post(find_path_handler))
        .route("/api/v1/path/reachable", post(reachable_handler))
        .route("/api/v1/path/connectivity", post(connectivity_handler))
        .route("/api/v1/regions", get(regions_handler))
        .route("/api/v1/regions/search", post(search_handler))
        .route("/api/v1/regions/validate", post(validate_handler))
        .route("/api/v1/regions/{identifier}", get(region_info_handler))
        .route("/api/v1/stats", get(stats_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(cors)
        .with_state(state)
}

fn validated<R: Validate>(request: &R, request_id: &RequestId) -> Result<(), ProblemDetails> {
    request.validate(request_id.as_str()).map_err(|problem| *problem)
}

/// Handle POST /api/v1/path/find.
///
/// Runs on the blocking pool since the route resolver performs blocking HTTP.
async fn find_path_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<FindPathRequest>,
) -> ApiResult<PathResponse> {
    if let Err(problem) = validated(&request, &request_id) {
        record_path_rejected();
        return Err(problem);
    }
    let path_request = request
        .to_path_request()
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;

    let service = state.service_arc();
    let outcome = task::spawn_blocking(move || service.find_path(&path_request))
        .await
        .map_err(|e| {
            ProblemDetails::internal_error(format!("path task failed: {}", e), request_id.as_str())
        })?;

    match outcome {
        Ok(result) => {
            record_path_found(&result);
            info!(
                request_id = %request_id,
                start = %request.start,
                end = %request.end,
                hops = result.hop_count(),
                "path request served"
            );
            Ok(ServiceResponse::new(PathResponse {
                hop_count: result.hop_count(),
                result,
            }))
        }
        Err(e) => {
            record_path_failed(&e);
            warn!(request_id = %request_id, error = %e, "path request failed");
            Err(from_lib_error(&e, request_id.as_str()))
        }
    }
}

/// Handle POST /api/v1/path/reachable.
async fn reachable_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<ReachableRequest>,
) -> ApiResult<ReachableResponse> {
    validated(&request, &request_id)?;

    let regions = state
        .service()
        .reachable(&request.start, request.max_hops)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;
    record_regions_returned(regions.len(), "reachable");

    Ok(ServiceResponse::new(ReachableResponse {
        start: request.start,
        max_hops: request.max_hops,
        count: regions.len(),
        regions,
    }))
}

/// Handle POST /api/v1/path/connectivity.
async fn connectivity_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<ConnectivityRequest>,
) -> ApiResult<ConnectivityReport> {
    validated(&request, &request_id)?;

    state
        .service()
        .check_connectivity(&request.first, &request.second)
        .map(ServiceResponse::new)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))
}

/// Handle GET /api/v1/regions.
async fn regions_handler(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResult<RegionListResponse> {
    let regions = state
        .service()
        .regions()
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;
    record_regions_returned(regions.len(), "regions");

    Ok(ServiceResponse::new(RegionListResponse {
        count: regions.len(),
        regions,
    }))
}

/// Handle GET /api/v1/regions/{identifier}.
async fn region_info_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(identifier): Path<String>,
) -> ApiResult<RegionInfo> {
    state
        .service()
        .region_info(&identifier)
        .map(ServiceResponse::new)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))
}

/// Handle POST /api/v1/regions/search.
async fn search_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<SearchRequest>,
) -> ApiResult<RegionListResponse> {
    validated(&request, &request_id)?;

    let regions = state
        .service()
        .search(&request.query, Some(request.limit))
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;
    record_regions_returned(regions.len(), "search");

    Ok(ServiceResponse::new(RegionListResponse {
        count: regions.len(),
        regions,
    }))
}

/// Handle POST /api/v1/regions/validate. Unknown identifiers still answer 200.
async fn validate_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<ValidateRequest>,
) -> ApiResult<IdentifierValidation> {
    validated(&request, &request_id)?;
    Ok(ServiceResponse::new(
        state.service().validate_identifier(&request.identifier),
    ))
}

/// Handle GET /api/v1/stats.
async fn stats_handler(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResult<ServiceStats> {
    state
        .service()
        .stats()
        .map(ServiceResponse::new)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))
}
