//! RFC 9457 Problem Details for HTTP APIs.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use waypath_lib::Error as LibError;

/// Problem type URI for node ids missing from the graph.
pub const PROBLEM_INVALID_ENDPOINT: &str = "/problems/invalid-endpoint";

/// Problem type URI for endpoints in disconnected parts of the graph.
pub const PROBLEM_NO_PATH_FOUND: &str = "/problems/no-path-found";

/// Problem type URI for graphs that fail validation or decoding.
pub const PROBLEM_MALFORMED_GRAPH: &str = "/problems/malformed-graph";

/// Problem type URI for coordinates too far from the network.
pub const PROBLEM_SNAP_OUT_OF_RANGE: &str = "/problems/snap-out-of-range";

/// Problem type URI for graphs that could not be fetched or read.
pub const PROBLEM_GRAPH_UNAVAILABLE: &str = "/problems/graph-unavailable";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response body.
///
/// ```
/// use waypath_service_shared::{ProblemDetails, PROBLEM_NO_PATH_FOUND};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(PROBLEM_NO_PATH_FOUND, "No Path Found", StatusCode::NOT_FOUND)
///     .with_detail("No route exists from node 1 to node 100")
///     .with_request_id("req-12345");
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,

    pub title: String,

    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request id of the failing call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Always `application/problem+json`.
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for a request that failed validation.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn invalid_endpoint(id: i64, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_ENDPOINT,
            "Invalid Endpoint",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("Node {id} does not exist in the graph"))
        .with_request_id(request_id)
    }

    pub fn no_path_found(start: i64, goal: i64, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NO_PATH_FOUND, "No Path Found", StatusCode::NOT_FOUND)
            .with_detail(format!("No route exists from node {start} to node {goal}"))
            .with_request_id(request_id)
    }

    pub fn malformed_graph(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_MALFORMED_GRAPH,
            "Malformed Graph",
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn snap_out_of_range(
        distance_m: f64,
        max_distance_m: f64,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(
            PROBLEM_SNAP_OUT_OF_RANGE,
            "Snap Out Of Range",
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .with_detail(format!(
            "Nearest node is {distance_m:.1} m away, beyond the {max_distance_m:.1} m limit"
        ))
        .with_request_id(request_id)
    }

    /// 502 when the graph behind `map_url` could not be retrieved.
    pub fn graph_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_GRAPH_UNAVAILABLE,
            "Graph Unavailable",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        *response.status_mut() = status;
        response
    }
}

/// Map a library error onto its problem type.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::InvalidEndpoint { id } => ProblemDetails::invalid_endpoint(*id, request_id),
        LibError::NoPathFound { start, goal } | LibError::SearchLimitExceeded { start, goal, .. } => {
            ProblemDetails::no_path_found(*start, *goal, request_id)
        }
        LibError::MalformedGraph { .. } | LibError::Json(_) => {
            ProblemDetails::malformed_graph(error.to_string(), request_id)
        }
        LibError::SnapOutOfRange {
            distance_m,
            max_distance_m,
        } => ProblemDetails::snap_out_of_range(*distance_m, *max_distance_m, request_id),
        LibError::EmptyGraph => {
            ProblemDetails::malformed_graph("Graph contains no nodes", request_id)
        }
        LibError::Http(_) | LibError::Io(_) => ProblemDetails::graph_unavailable(
            format!("Graph could not be loaded: {error}"),
            request_id,
        ),
        LibError::UnknownMode { .. } | LibError::InvalidParameters { .. } => {
            ProblemDetails::bad_request(error.to_string(), request_id)
        }
    }
}
