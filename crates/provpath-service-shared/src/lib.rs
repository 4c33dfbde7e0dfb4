//! Shared infrastructure for provpath HTTP services.
//!
//! - [`AppState`]: the loaded registry, graph and optional route resolver
//! - [`health`]: liveness and readiness probes
//! - [`ProblemDetails`]: RFC 9457 error bodies
//! - [`ServiceResponse`]: success body wrapper carrying its content type
//! - [`metrics`]: Prometheus recorder and business counters
//! - [`logging`]: JSON or text tracing setup
//! - [`middleware`]: request IDs and per-request HTTP metrics
//! - request types with validation for each endpoint
//!
//! Handlers stay thin: parse and validate the body, call
//! [`provpath_lib::PathfindingService`], then format the result or map the
//! library error through [`from_lib_error`].
//!
//! The [`test_utils`] module is available to dependent crates through the
//! `test-utils` feature.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    failure_reason, init_metrics, metrics_handler, record_path_failed, record_path_found,
    record_path_rejected, record_regions_returned, record_route_enrichment, MetricsConfig,
    MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_PATH_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNKNOWN_REGION,
};
pub use request::{
    ConnectivityRequest, FindPathRequest, ReachableRequest, SearchRequest, Validate,
    ValidateRequest, MAX_SEARCH_LIMIT,
};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
