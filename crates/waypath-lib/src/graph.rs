use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Identifier of a node as it appears in the graph JSON.
pub type NodeId = i64;

/// Junction or waypoint on the walking network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Great-circle distance to another node in metres.
    pub fn distance_to(&self, other: &Node) -> f64 {
        self.coordinate().distance_to(&other.coordinate())
    }
}

/// Undirected road segment. `weight` is a physical length in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub weight: f64,
}

/// Serialized graph as uploaded by map authors.
///
/// `bounds` is viewport metadata only; the router never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub bounds: Vec<[f64; 2]>,
}

/// Adjacency entry pointing at the dense index of a neighbouring node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub target: usize,
    pub weight: f64,
}

/// Immutable routing graph with dense node indices.
///
/// Node ids are resolved to indices once at construction; all search code
/// works on indices and only translates back when building results.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<Neighbour>>,
    bounds: Vec<[f64; 2]>,
    edge_count: usize,
    skipped_edges: usize,
}

impl Graph {
    /// Validate `data` and build the adjacency structure in O(|V| + |E|).
    ///
    /// Edges that reference unknown node ids are dropped and counted rather
    /// than rejected. Non-finite coordinates or weights, negative weights and
    /// duplicate node ids make the whole graph invalid.
    pub fn from_data(data: GraphData) -> Result<Self> {
        let GraphData {
            nodes,
            edges,
            bounds,
        } = data;

        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if !node.coordinate().is_valid() {
                return Err(Error::malformed(format!(
                    "node {} has invalid coordinates ({}, {})",
                    node.id, node.lat, node.lon
                )));
            }
            if index.insert(node.id, position).is_some() {
                return Err(Error::malformed(format!("duplicate node id {}", node.id)));
            }
        }

        let mut adjacency: Vec<Vec<Neighbour>> = vec![Vec::new(); nodes.len()];
        let mut edge_count = 0usize;
        let mut skipped_edges = 0usize;

        for edge in &edges {
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(Error::malformed(format!(
                    "edge {} - {} has invalid weight {}",
                    edge.u, edge.v, edge.weight
                )));
            }

            let (Some(&u), Some(&v)) = (index.get(&edge.u), index.get(&edge.v)) else {
                skipped_edges += 1;
                continue;
            };

            adjacency[u].push(Neighbour {
                target: v,
                weight: edge.weight,
            });
            adjacency[v].push(Neighbour {
                target: u,
                weight: edge.weight,
            });
            edge_count += 1;
        }

        if skipped_edges > 0 {
            warn!(
                skipped = skipped_edges,
                "ignored edges referencing unknown node ids"
            );
        }
        debug!(nodes = nodes.len(), edges = edge_count, "graph built");

        Ok(Self {
            nodes,
            index,
            adjacency,
            bounds,
            edge_count,
            skipped_edges,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges that made it into the adjacency structure.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of input edges dropped because an endpoint was unknown.
    pub fn skipped_edges(&self) -> usize {
        self.skipped_edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in input order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn bounds(&self) -> &[[f64; 2]] {
        &self.bounds
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Dense index for a node id.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// Node stored at a dense index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; indices only come from this graph.
    pub fn node_at(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// Adjacency entries for a dense index, including parallel edges and self-loops.
    pub fn neighbours(&self, index: usize) -> &[Neighbour] {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Neighbours of a node id as `(neighbour id, weight)` pairs.
    pub fn neighbours_of(&self, id: NodeId) -> Vec<(NodeId, f64)> {
        self.index_of(id)
            .map(|index| {
                self.neighbours(index)
                    .iter()
                    .map(|n| (self.nodes[n.target].id, n.weight))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Lightest edge weight between two dense indices.
    ///
    /// Parallel edges collapse to their minimum, which is the one any
    /// optimal search relaxes.
    pub fn edge_weight(&self, from: usize, to: usize) -> Option<f64> {
        self.neighbours(from)
            .iter()
            .filter(|n| n.target == to)
            .map(|n| n.weight)
            .min_by(f64::total_cmp)
    }
}

impl TryFrom<GraphData> for Graph {
    type Error = Error;

    fn try_from(data: GraphData) -> Result<Self> {
        Graph::from_data(data)
    }
}
