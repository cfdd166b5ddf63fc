//! Snap arbitrary coordinates onto the graph.
//!
//! [`nearest_node`] ranks nodes by squared Euclidean distance in degree space,
//! which is cheap and consistent across one campus-sized dataset. The
//! geodesic check against a maximum snap distance is a separate policy
//! ([`SnapPolicy`]) because different callers accept different slack.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::geo::distance_meters;
use crate::graph::{Graph, Node};

/// Snap distance used for points picked by hand on a map.
pub const MANUAL_SNAP_DISTANCE_M: f64 = 1000.0;

/// Snap distance used for live location tracking.
pub const TRACKING_SNAP_DISTANCE_M: f64 = 150.0;

/// Closest node to `(lat, lon)`, or `None` for an empty graph.
///
/// Ties keep the first node in input order.
pub fn nearest_node(graph: &Graph, lat: f64, lon: f64) -> Option<&Node> {
    let mut best: Option<(&Node, f64)> = None;
    for node in graph.nodes() {
        let d_lat = node.lat - lat;
        let d_lon = node.lon - lon;
        let dist_sq = d_lat * d_lat + d_lon * d_lon;
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {}
            _ => best = Some((node, dist_sq)),
        }
    }
    best.map(|(node, _)| node)
}

/// Maximum distance a query point may sit from the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPolicy {
    pub max_distance_m: f64,
}

impl SnapPolicy {
    pub fn new(max_distance_m: f64) -> Self {
        Self { max_distance_m }
    }

    pub fn manual() -> Self {
        Self::new(MANUAL_SNAP_DISTANCE_M)
    }

    pub fn tracking() -> Self {
        Self::new(TRACKING_SNAP_DISTANCE_M)
    }

    /// Find the nearest node and reject it if it lies beyond the policy limit.
    ///
    /// A NaN limit accepts nothing.
    pub fn snap<'g>(&self, graph: &'g Graph, lat: f64, lon: f64) -> Result<Snapped<'g>> {
        let node = nearest_node(graph, lat, lon).ok_or(Error::EmptyGraph)?;
        let distance_m = distance_meters(lat, lon, node.lat, node.lon);

        if self.max_distance_m.is_nan() || distance_m > self.max_distance_m {
            return Err(Error::SnapOutOfRange {
                distance_m,
                max_distance_m: self.max_distance_m,
            });
        }

        Ok(Snapped { node, distance_m })
    }
}

impl Default for SnapPolicy {
    fn default() -> Self {
        Self::manual()
    }
}

/// Accepted snap result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapped<'g> {
    pub node: &'g Node,
    pub distance_m: f64,
}
