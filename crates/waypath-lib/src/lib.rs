//! Waypath routing engine.
//!
//! This crate loads georeferenced walking networks, snaps coordinates onto
//! them and runs multi-criteria A* searches (shortest, energy efficient and
//! least turn). Higher-level consumers (CLI, HTTP service) should only depend
//! on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod geo;
pub mod graph;
pub mod locator;
pub mod output;
pub mod path;
pub mod queue;
pub mod result;
pub mod routing;
pub mod source;

pub use error::{Error, Result};
pub use geo::{distance_meters, Coordinate, EARTH_RADIUS_M};
pub use graph::{Edge, Graph, GraphData, Neighbour, Node, NodeId};
pub use locator::{
    nearest_node, SnapPolicy, Snapped, MANUAL_SNAP_DISTANCE_M, TRACKING_SNAP_DISTANCE_M,
};
pub use output::{RouteRenderMode, RouteStep, RouteSummary};
pub use path::{find_route, find_route_with};
pub use queue::MinQueue;
pub use result::RouteResult;
pub use routing::{
    plan_route, select_cost_model, CostModel, CostParameters, Endpoint, RouteMode, RouteRequest,
    SearchLimits,
};
pub use source::{
    fetch_graph, load_graph, load_graph_file, parse_graph, GraphCache, GraphSource,
    DEFAULT_GRAPH_CACHE_CAPACITY,
};
