use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::routing::{CostModel, RouteMode};

/// Route returned by the pathfinder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub mode: RouteMode,
    pub path_node_ids: Vec<NodeId>,
    /// `[lat, lon]` per node in `path_node_ids`.
    pub path_coords: Vec<[f64; 2]>,
    /// Sum of edge weights along the path, whatever the mode optimised.
    pub total_distance_m: f64,
    /// Score minimised by the mode's cost model.
    pub total_cost: f64,
    pub cost_units: String,
    pub turn_count: usize,
}

impl RouteResult {
    /// Build a result from a path of dense indices.
    ///
    /// Distance and turn count are recomputed from the emitted path instead
    /// of being carried over from the search, so they always describe the
    /// exact node sequence returned.
    pub(crate) fn build(
        graph: &Graph,
        path: &[usize],
        total_cost: f64,
        model: &dyn CostModel,
    ) -> Result<Self> {
        let mut total_distance_m = 0.0;
        for pair in path.windows(2) {
            let weight = graph.edge_weight(pair[0], pair[1]).ok_or_else(|| {
                Error::malformed(format!(
                    "no edge between {} and {} on reconstructed path",
                    graph.node_at(pair[0]).id,
                    graph.node_at(pair[1]).id
                ))
            })?;
            total_distance_m += weight;
        }

        let (path_node_ids, path_coords) = path
            .iter()
            .map(|&index| {
                let node = graph.node_at(index);
                (node.id, [node.lat, node.lon])
            })
            .unzip();

        Ok(Self {
            mode: model.mode(),
            path_node_ids,
            path_coords,
            total_distance_m,
            total_cost,
            cost_units: model.units().to_string(),
            turn_count: model.count_turns(graph, path),
        })
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.path_node_ids.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<NodeId> {
        self.path_node_ids.first().copied()
    }

    pub fn goal(&self) -> Option<NodeId> {
        self.path_node_ids.last().copied()
    }
}
