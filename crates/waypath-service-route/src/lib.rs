//! Walking route planning over HTTP.
//!
//! # Endpoints
//!
//! - `POST /api/v1/route` - route between two node ids
//! - `POST /api/v1/nearest` - snap a coordinate to the closest node
//! - `GET /metrics` - Prometheus metrics
//! - `GET /health/live`, `GET /health/ready` - probes
//!
//! Graph loading and searching are CPU-bound and may block on a remote
//! fetch, so both handlers run them on the blocking pool.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use waypath_lib::{plan_route, Error as LibError, RouteRequest as LibRouteRequest};
use waypath_service_shared::{
    failure_reason, from_lib_error, health_live, health_ready, metrics_handler,
    record_route_calculated, record_route_failed, record_route_path_nodes, record_snap, AppState,
    GraphAccessError, MetricsLayer, NearestRequest, NearestResponse, ProblemDetails, RequestId,
    RouteRequest, RouteResponse, ServiceResponse, Validate,
};

/// Either a success body or an RFC 9457 problem.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

/// Build the service router around `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/route", post(route_handler))
        .route("/api/v1/nearest", post(nearest_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer)
        .with_state(state)
}

/// What went wrong inside the blocking section of a handler.
enum Failure {
    Graph(GraphAccessError),
    Engine(LibError),
}

impl Failure {
    fn reason(&self) -> &'static str {
        match self {
            Failure::Graph(err) => err.reason(),
            Failure::Engine(err) => failure_reason(err),
        }
    }

    fn into_problem(self, request_id: &str) -> ProblemDetails {
        match self {
            Failure::Graph(err) => err.to_problem(request_id),
            Failure::Engine(err) => from_lib_error(&err, request_id),
        }
    }
}

fn log_problem(request_id: &RequestId, problem: &ProblemDetails, message: &str) {
    if problem.status >= 500 {
        error!(request_id = %request_id, status = problem.status, detail = ?problem.detail, "{message}");
    } else {
        warn!(request_id = %request_id, status = problem.status, detail = ?problem.detail, "{message}");
    }
}

fn rejected(rejection: JsonRejection, request_id: &RequestId) -> ProblemDetails {
    ProblemDetails::bad_request(rejection.body_text(), request_id.as_str())
}

/// `POST /api/v1/route`
pub async fn route_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Response<RouteResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            record_route_failed("validation_error");
            let problem = rejected(rejection, &request_id);
            log_problem(&request_id, &problem, "route request rejected");
            return Response::Error(problem);
        }
    };

    info!(
        request_id = %request_id,
        source_id = request.source_id,
        target_id = request.target_id,
        mode = %request.mode,
        map_url = request.map_url.as_deref().unwrap_or("-"),
        "handling route request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_route_failed("validation_error");
        log_problem(&request_id, &problem, "route request rejected");
        return Response::Error(*problem);
    }

    let mode = match request.route_mode() {
        Ok(mode) => mode,
        Err(err) => return Response::Error(from_lib_error(&err, request_id.as_str())),
    };

    let outcome = tokio::task::spawn_blocking(move || {
        let graph = state
            .graph_for(request.map_url.as_deref())
            .map_err(Failure::Graph)?;
        let lib_request = LibRouteRequest::between_nodes(request.source_id, request.target_id, mode);
        plan_route(&graph, &lib_request).map_err(Failure::Engine)
    })
    .await;

    let route = match outcome {
        Ok(Ok(route)) => route,
        Ok(Err(failure)) => {
            record_route_failed(failure.reason());
            let problem = failure.into_problem(request_id.as_str());
            log_problem(&request_id, &problem, "route planning failed");
            return Response::Error(problem);
        }
        Err(join_error) => {
            record_route_failed("internal_error");
            error!(request_id = %request_id, error = %join_error, "route task panicked");
            return Response::Error(ProblemDetails::internal_error(
                "Route computation did not complete",
                request_id.as_str(),
            ));
        }
    };

    record_route_calculated(mode);
    record_route_path_nodes(mode, route.path_node_ids.len());

    info!(
        request_id = %request_id,
        mode = %mode,
        nodes = route.path_node_ids.len(),
        distance_m = route.total_distance_m,
        turns = route.turn_count,
        "route computed"
    );

    Response::Success(ServiceResponse::new(RouteResponse::from(route)))
}

/// `POST /api/v1/nearest`
pub async fn nearest_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<NearestRequest>, JsonRejection>,
) -> Response<NearestResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return Response::Error(rejected(rejection, &request_id)),
    };

    if let Err(problem) = request.validate(request_id.as_str()) {
        log_problem(&request_id, &problem, "nearest request rejected");
        return Response::Error(*problem);
    }

    let outcome = tokio::task::spawn_blocking(move || {
        let graph = state
            .graph_for(request.map_url.as_deref())
            .map_err(Failure::Graph)?;
        request
            .snap_policy()
            .snap(&graph, request.lat, request.lon)
            .map(NearestResponse::from)
            .map_err(Failure::Engine)
    })
    .await;

    match outcome {
        Ok(Ok(nearest)) => {
            record_snap("snapped");
            info!(
                request_id = %request_id,
                node_id = nearest.node_id,
                distance_m = nearest.distance_m,
                "coordinate snapped"
            );
            Response::Success(ServiceResponse::new(nearest))
        }
        Ok(Err(failure)) => {
            if matches!(failure, Failure::Engine(LibError::SnapOutOfRange { .. })) {
                record_snap("out_of_range");
            }
            let problem = failure.into_problem(request_id.as_str());
            log_problem(&request_id, &problem, "nearest lookup failed");
            Response::Error(problem)
        }
        Err(join_error) => {
            error!(request_id = %request_id, error = %join_error, "nearest task panicked");
            Response::Error(ProblemDetails::internal_error(
                "Nearest-node lookup did not complete",
                request_id.as_str(),
            ))
        }
    }
}
