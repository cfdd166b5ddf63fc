//! Route planning entry points.
//!
//! This module provides:
//! - [`RouteMode`] - Supported optimisation criteria
//! - [`RouteRequest`] - High-level request with endpoints, parameters and limits
//! - [`SearchLimits`] - External cap on search effort
//! - [`plan_route`] - Resolve endpoints, pick a cost model and run the search
//!
//! # Strategy Pattern
//!
//! Each mode is encapsulated by a [`CostModel`] implementation in [`cost`]. The
//! search itself never branches on the mode; it only asks the model for edge
//! costs, heuristics and whether arrival direction matters.
//!
//! # Example
//!
//! ```ignore
//! use waypath_lib::{load_graph_file, plan_route, RouteMode, RouteRequest};
//!
//! let graph = load_graph_file("campus.json")?;
//! let request = RouteRequest::between_nodes(1, 42, RouteMode::LeastTurn);
//! let route = plan_route(&graph, &request)?;
//! println!("{} turns over {:.0} m", route.turn_count, route.total_distance_m);
//! ```

pub mod cost;

pub use cost::{
    count_sharp_turns, select_cost_model, turn_angle_degrees, CostModel, CostParameters,
    EnergyCost, LeastTurnCost, ShortestCost, ENERGY_PENALTY_FACTOR, SHARP_TURN_THRESHOLD_DEG,
    TURN_PENALTY_M,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::locator::SnapPolicy;
use crate::path::find_route_with;
use crate::result::RouteResult;

/// Optimisation criterion for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Minimise physical distance.
    #[default]
    Shortest,
    /// Minimise distance scaled by the energy factor.
    EnergyEfficient,
    /// Minimise distance plus a penalty per sharp turn.
    LeastTurn,
}

impl RouteMode {
    pub const ALL: [RouteMode; 3] = [
        RouteMode::Shortest,
        RouteMode::EnergyEfficient,
        RouteMode::LeastTurn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMode::Shortest => "shortest",
            RouteMode::EnergyEfficient => "energy_efficient",
            RouteMode::LeastTurn => "least_turn",
        }
    }

    /// Label reported alongside `total_cost`.
    pub fn units(&self) -> &'static str {
        match self {
            RouteMode::Shortest => "meters",
            RouteMode::EnergyEfficient => "energy_units",
            RouteMode::LeastTurn => "meters_with_turn_penalty",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "shortest" => Ok(RouteMode::Shortest),
            "energy_efficient" | "energy" => Ok(RouteMode::EnergyEfficient),
            "least_turn" | "least_turns" => Ok(RouteMode::LeastTurn),
            _ => Err(Error::UnknownMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Cap on the work a single search may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Maximum number of states expanded before giving up. `None` is unlimited.
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_expansions(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
        }
    }
}

/// Where a route starts or ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    /// A node id taken verbatim from the graph.
    Node(NodeId),
    /// A free coordinate snapped to the nearest node.
    Coordinate { lat: f64, lon: f64 },
}

impl From<NodeId> for Endpoint {
    fn from(id: NodeId) -> Self {
        Endpoint::Node(id)
    }
}

impl Endpoint {
    fn resolve(&self, graph: &Graph, snap: &SnapPolicy) -> Result<NodeId> {
        match *self {
            Endpoint::Node(id) => Ok(id),
            Endpoint::Coordinate { lat, lon } => {
                let snapped = snap.snap(graph, lat, lon)?;
                debug!(
                    lat,
                    lon,
                    node = snapped.node.id,
                    distance_m = snapped.distance_m,
                    "snapped endpoint"
                );
                Ok(snapped.node.id)
            }
        }
    }
}

/// High-level route planning request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: Endpoint,
    pub goal: Endpoint,
    pub mode: RouteMode,
    pub parameters: CostParameters,
    pub snap: SnapPolicy,
    pub limits: SearchLimits,
}

impl RouteRequest {
    /// Request between two endpoints with default parameters and no limits.
    pub fn new(start: Endpoint, goal: Endpoint, mode: RouteMode) -> Self {
        Self {
            start,
            goal,
            mode,
            parameters: CostParameters::default(),
            snap: SnapPolicy::default(),
            limits: SearchLimits::default(),
        }
    }

    /// Convenience constructor for two node ids.
    pub fn between_nodes(start: NodeId, goal: NodeId, mode: RouteMode) -> Self {
        Self::new(Endpoint::Node(start), Endpoint::Node(goal), mode)
    }

    pub fn with_parameters(mut self, parameters: CostParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_snap_policy(mut self, snap: SnapPolicy) -> Self {
        self.snap = snap;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Plan a route for `request` against an already loaded graph.
///
/// Cost parameters are validated before anything else, then coordinate
/// endpoints are snapped. A search stopped by
/// [`SearchLimits`] is reported as [`Error::NoPathFound`]; this is an
/// approximation, the goal may still be reachable.
pub fn plan_route(graph: &Graph, request: &RouteRequest) -> Result<RouteResult> {
    request.parameters.validate()?;
    let start = request.start.resolve(graph, &request.snap)?;
    let goal = request.goal.resolve(graph, &request.snap)?;

    let model = select_cost_model(request.mode, &request.parameters);

    match find_route_with(graph, start, goal, model.as_ref(), &request.limits) {
        Err(Error::SearchLimitExceeded {
            start,
            goal,
            expansions,
        }) => {
            warn!(
                start,
                goal,
                expansions,
                mode = %request.mode,
                "search limit reached; reporting no path"
            );
            Err(Error::NoPathFound { start, goal })
        }
        other => other,
    }
}
