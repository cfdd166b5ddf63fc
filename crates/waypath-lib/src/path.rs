use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::queue::MinQueue;
use crate::result::RouteResult;
use crate::routing::cost::{select_cost_model, CostModel, CostParameters};
use crate::routing::{RouteMode, SearchLimits};

/// Search state. `via` is the node the search arrived from and is only
/// populated for turn-aware cost models; otherwise the state is the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StateKey {
    node: usize,
    via: Option<usize>,
}

/// Path of dense indices and its cost under the active model.
#[derive(Debug, Clone)]
pub(crate) struct SearchOutcome {
    pub path: Vec<usize>,
    pub cost: f64,
    pub expanded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchFailure {
    Exhausted,
    LimitReached(usize),
}

/// Find the optimal route between two node ids using default cost parameters.
pub fn find_route(graph: &Graph, start: NodeId, goal: NodeId, mode: RouteMode) -> Result<RouteResult> {
    let model = select_cost_model(mode, &CostParameters::default());
    find_route_with(graph, start, goal, model.as_ref(), &SearchLimits::default())
}

/// Run A* with an explicit cost model and search limits.
///
/// Returns [`Error::InvalidParameters`] when the model's constants are
/// unusable, [`Error::InvalidEndpoint`] when either id is missing,
/// [`Error::NoPathFound`] when the queue drains without reaching `goal`, and
/// [`Error::SearchLimitExceeded`] when `limits` stop the search early.
pub fn find_route_with(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    model: &dyn CostModel,
    limits: &SearchLimits,
) -> Result<RouteResult> {
    model.validate()?;

    let start_index = graph
        .index_of(start)
        .ok_or(Error::InvalidEndpoint { id: start })?;
    let goal_index = graph
        .index_of(goal)
        .ok_or(Error::InvalidEndpoint { id: goal })?;

    match a_star(graph, start_index, goal_index, model, limits) {
        Ok(outcome) => {
            debug!(
                mode = %model.mode(),
                start,
                goal,
                expanded = outcome.expanded,
                hops = outcome.path.len().saturating_sub(1),
                cost = outcome.cost,
                "route found"
            );
            RouteResult::build(graph, &outcome.path, outcome.cost, model)
        }
        Err(SearchFailure::Exhausted) => Err(Error::NoPathFound { start, goal }),
        Err(SearchFailure::LimitReached(expansions)) => Err(Error::SearchLimitExceeded {
            start,
            goal,
            expansions,
        }),
    }
}

/// Best-first search over `(node, arrived_from)` states.
///
/// Queue entries carry the g-score they were pushed with; an entry whose
/// recorded g-score has since improved is stale and skipped. The goal is
/// accepted only when popped, never when pushed.
pub(crate) fn a_star(
    graph: &Graph,
    start: usize,
    goal: usize,
    model: &dyn CostModel,
    limits: &SearchLimits,
) -> std::result::Result<SearchOutcome, SearchFailure> {
    let turn_aware = model.turn_aware();
    let start_key = StateKey {
        node: start,
        via: None,
    };

    let mut g_score: HashMap<StateKey, f64> = HashMap::new();
    let mut parents: HashMap<StateKey, StateKey> = HashMap::new();
    let mut queue = MinQueue::new();

    g_score.insert(start_key, 0.0);
    queue.insert((start_key, 0.0), model.heuristic(graph, start, goal));

    let mut expanded = 0usize;

    while let Some(((key, pushed_g), _)) = queue.extract_min() {
        let current_g = match g_score.get(&key) {
            Some(score) if *score < pushed_g => continue,
            Some(score) => *score,
            None => continue,
        };

        if key.node == goal {
            return Ok(SearchOutcome {
                path: reconstruct_path(&parents, key),
                cost: current_g,
                expanded,
            });
        }

        if let Some(max) = limits.max_expansions {
            if expanded >= max {
                return Err(SearchFailure::LimitReached(expanded));
            }
        }
        expanded += 1;

        for neighbour in graph.neighbours(key.node) {
            let next = neighbour.target;
            let step = model.edge_cost(graph, key.via, key.node, next, neighbour.weight);
            let tentative_g = current_g + step;

            let next_key = StateKey {
                node: next,
                via: turn_aware.then_some(key.node),
            };

            if tentative_g < *g_score.get(&next_key).unwrap_or(&f64::INFINITY) {
                g_score.insert(next_key, tentative_g);
                parents.insert(next_key, key);
                let estimate = tentative_g + model.heuristic(graph, next, goal);
                queue.insert((next_key, tentative_g), estimate);
            }
        }
    }

    Err(SearchFailure::Exhausted)
}

fn reconstruct_path(parents: &HashMap<StateKey, StateKey>, goal: StateKey) -> Vec<usize> {
    let mut path = vec![goal.node];
    let mut current = goal;
    while let Some(parent) = parents.get(&current) {
        path.push(parent.node);
        current = *parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, GraphData, Node};
    use crate::routing::cost::{LeastTurnCost, ShortestCost};

    fn line_graph() -> Graph {
        Graph::from_data(GraphData {
            nodes: vec![
                Node { id: 0, lat: 0.0, lon: 0.0 },
                Node { id: 1, lat: 0.0, lon: 0.001 },
                Node { id: 2, lat: 0.0, lon: 0.002 },
            ],
            edges: vec![
                Edge { u: 0, v: 1, weight: 120.0 },
                Edge { u: 1, v: 2, weight: 120.0 },
            ],
            bounds: vec![],
        })
        .expect("valid graph")
    }

    #[test]
    fn start_equals_goal_is_single_node_path() {
        let graph = line_graph();
        let outcome = a_star(&graph, 1, 1, &ShortestCost, &SearchLimits::default()).expect("path");
        assert_eq!(outcome.path, vec![1]);
        assert_eq!(outcome.cost, 0.0);
    }

    #[test]
    fn expansion_limit_stops_search() {
        let graph = line_graph();
        let limits = SearchLimits {
            max_expansions: Some(1),
        };
        let failure = a_star(&graph, 0, 2, &ShortestCost, &limits).unwrap_err();
        assert_eq!(failure, SearchFailure::LimitReached(1));
    }

    #[test]
    fn turn_aware_states_reconstruct_node_path() {
        let graph = line_graph();
        let outcome =
            a_star(&graph, 0, 2, &LeastTurnCost::default(), &SearchLimits::default()).expect("path");
        assert_eq!(outcome.path, vec![0, 1, 2]);
        assert!((outcome.cost - 240.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_endpoints_are_reported() {
        let graph = line_graph();
        let err = find_route(&graph, 0, 42, RouteMode::Shortest).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { id: 42 }));
        let err = find_route(&graph, -1, 2, RouteMode::Shortest).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { id: -1 }));
    }
}
