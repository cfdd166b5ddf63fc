#![allow(dead_code)]

use std::path::PathBuf;

use waypath_lib::{distance_meters, load_graph_file, Edge, Graph, GraphData, Node, NodeId};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn campus_graph() -> Graph {
    load_graph_file(fixtures_dir().join("campus_graph.json")).expect("campus fixture loads")
}

pub fn graph_from(nodes: &[(NodeId, f64, f64)], edges: &[(NodeId, NodeId, f64)]) -> Graph {
    Graph::from_data(GraphData {
        nodes: nodes
            .iter()
            .map(|&(id, lat, lon)| Node { id, lat, lon })
            .collect(),
        edges: edges
            .iter()
            .map(|&(u, v, weight)| Edge { u, v, weight })
            .collect(),
        bounds: vec![],
    })
    .expect("valid test graph")
}

/// The four-node square with a diagonal shortcut from 0 to 2.
pub fn square_with_diagonal() -> Graph {
    graph_from(
        &[(0, 0.0, 0.0), (1, 0.0, 1.0), (2, 1.0, 1.0), (3, 1.0, 0.0)],
        &[
            (0, 1, 1.0),
            (1, 2, 1.0),
            (2, 3, 1.0),
            (3, 0, 1.0),
            (0, 2, 1.5),
        ],
    )
}

/// Small deterministic generator so property tests need no extra crates.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() % 1_000_000) as f64 / 1_000_000.0
    }

    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Random campus-sized graph whose edge weights are never shorter than the
/// straight-line distance between their endpoints.
pub fn random_graph(seed: u64, node_count: usize, edge_count: usize) -> Graph {
    let mut rng = Lcg::new(seed);
    let nodes: Vec<(NodeId, f64, f64)> = (0..node_count)
        .map(|i| {
            (
                i as NodeId * 3 + 1,
                12.97 + rng.next_f64() * 0.004,
                77.59 + rng.next_f64() * 0.004,
            )
        })
        .collect();

    let mut edges = Vec::with_capacity(edge_count);
    for _ in 0..edge_count {
        let a = rng.below(node_count);
        let b = rng.below(node_count);
        let (u, lat1, lon1) = nodes[a];
        let (v, lat2, lon2) = nodes[b];
        let stretch = 1.0 + rng.next_f64() * 0.5;
        edges.push((u, v, distance_meters(lat1, lon1, lat2, lon2) * stretch));
    }

    graph_from(&nodes, &edges)
}

/// Every simple path between two node ids.
pub fn simple_paths(graph: &Graph, start: NodeId, goal: NodeId) -> Vec<Vec<NodeId>> {
    fn walk(
        graph: &Graph,
        current: NodeId,
        goal: NodeId,
        path: &mut Vec<NodeId>,
        out: &mut Vec<Vec<NodeId>>,
    ) {
        if current == goal {
            out.push(path.clone());
            return;
        }
        for (next, _) in graph.neighbours_of(current) {
            if path.contains(&next) {
                continue;
            }
            path.push(next);
            walk(graph, next, goal, path, out);
            path.pop();
        }
    }

    let mut out = Vec::new();
    let mut path = vec![start];
    walk(graph, start, goal, &mut path, &mut out);
    out
}

/// Lightest edge weight between two node ids.
pub fn weight_between(graph: &Graph, u: NodeId, v: NodeId) -> f64 {
    graph
        .neighbours_of(u)
        .into_iter()
        .filter(|(id, _)| *id == v)
        .map(|(_, weight)| weight)
        .fold(f64::INFINITY, f64::min)
}

pub fn path_distance(graph: &Graph, path: &[NodeId]) -> f64 {
    path.windows(2)
        .map(|pair| weight_between(graph, pair[0], pair[1]))
        .sum()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}
