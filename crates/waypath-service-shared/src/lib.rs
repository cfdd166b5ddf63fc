//! Shared infrastructure for waypath HTTP microservices.
//!
//! - [`AppState`]: graph cache plus the optional preloaded default graph
//! - [`health`](health_live): liveness and readiness probes
//! - [`ProblemDetails`]: RFC 9457 error bodies
//! - [`ServiceResponse`]: success bodies tagged with their content type
//! - [`metrics`]: Prometheus recorder and routing metrics
//! - [`logging`]: JSON or text `tracing` output
//! - [`middleware`]: request ids and HTTP metrics
//!
//! Handlers stay thin: parse and validate the request here, then call into
//! `waypath-lib` for everything that touches the graph.
//!
//! # Testing Support
//!
//! Enable the `test-utils` feature for [`test_utils`], which preloads the
//! campus fixture graph.

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
    failure_reason, init_metrics, metrics_handler, record_route_calculated, record_route_failed,
    record_route_path_nodes, record_snap, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_GRAPH_UNAVAILABLE, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_ENDPOINT, PROBLEM_INVALID_REQUEST, PROBLEM_MALFORMED_GRAPH,
    PROBLEM_NO_PATH_FOUND, PROBLEM_SNAP_OUT_OF_RANGE,
};
pub use request::{NearestRequest, RouteRequest, Validate};
pub use response::{NearestResponse, RouteResponse, ServiceResponse};
pub use state::{AppState, AppStateError, GraphAccessError, StateConfig};
