//! Success payloads and the content-type wrapper they are returned in.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use waypath_lib::{NodeId, RouteResult, Snapped};

/// Successful response body, mirroring `ProblemDetails` by naming its own
/// content type.
///
/// ```
/// use waypath_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Hops {
///     hops: usize,
/// }
///
/// let response = ServiceResponse::new(Hops { hops: 5 });
/// assert_eq!(response.content_type, "application/json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,

    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Route body in the shape the map front end consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub status: String,
    pub mode: String,
    pub path_node_ids: Vec<NodeId>,
    /// `[lat, lon]` pairs, aligned with `path_node_ids`.
    pub path_coords: Vec<[f64; 2]>,
    pub total_cost: f64,
    pub total_physical_distance: f64,
    pub units: String,
    pub turn_count: usize,
}

impl From<RouteResult> for RouteResponse {
    fn from(route: RouteResult) -> Self {
        Self {
            status: "ok".to_string(),
            mode: route.mode.as_str().to_string(),
            path_node_ids: route.path_node_ids,
            path_coords: route.path_coords,
            total_cost: route.total_cost,
            total_physical_distance: route.total_distance_m,
            units: route.cost_units,
            turn_count: route.turn_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestResponse {
    pub status: String,
    pub node_id: NodeId,
    pub lat: f64,
    pub lon: f64,
    pub distance_m: f64,
}

impl From<Snapped<'_>> for NearestResponse {
    fn from(snapped: Snapped<'_>) -> Self {
        Self {
            status: "ok".to_string(),
            node_id: snapped.node.id,
            lat: snapped.node.lat,
            lon: snapped.node.lon,
            distance_m: snapped.distance_m,
        }
    }
}
