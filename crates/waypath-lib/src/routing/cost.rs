//! Cost models implementing the Strategy pattern.
//!
//! Each routing mode supplies its own edge cost and admissible heuristic via
//! the [`CostModel`] trait, so the pathfinder stays a single generic search.
//! The least-turn model is the only one whose edge cost depends on how the
//! search arrived at the pivot node, which is why the search keys its state
//! on `(node, arrived_from)` when [`CostModel::turn_aware`] is set.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{Graph, Node};

use super::RouteMode;

/// Extra physiological cost per metre in energy-efficient mode.
pub const ENERGY_PENALTY_FACTOR: f64 = 1.2;

/// Metre-equivalent penalty charged for each sharp turn.
pub const TURN_PENALTY_M: f64 = 50.0;

/// Interior angles below this many degrees count as a sharp turn.
pub const SHARP_TURN_THRESHOLD_DEG: f64 = 150.0;

/// Tunable constants for the cost models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    pub energy_penalty_factor: f64,
    pub turn_penalty_m: f64,
    pub sharp_turn_threshold_deg: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            energy_penalty_factor: ENERGY_PENALTY_FACTOR,
            turn_penalty_m: TURN_PENALTY_M,
            sharp_turn_threshold_deg: SHARP_TURN_THRESHOLD_DEG,
        }
    }
}

impl CostParameters {
    /// Reject values that would give edges a negative or NaN cost.
    ///
    /// The energy factor must be finite and positive; the turn penalty and
    /// threshold must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        check_energy_factor(self.energy_penalty_factor)?;
        check_turn_penalty(self.turn_penalty_m)?;
        check_turn_threshold(self.sharp_turn_threshold_deg)
    }
}

fn check_energy_factor(factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameters(format!(
            "energy_penalty_factor must be a positive number, got {factor}"
        )))
    }
}

fn check_turn_penalty(penalty_m: f64) -> Result<()> {
    if penalty_m.is_finite() && penalty_m >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameters(format!(
            "turn_penalty_m must be zero or more, got {penalty_m}"
        )))
    }
}

fn check_turn_threshold(threshold_deg: f64) -> Result<()> {
    if threshold_deg.is_finite() && threshold_deg >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameters(format!(
            "sharp_turn_threshold_deg must be zero or more, got {threshold_deg}"
        )))
    }
}

/// Interior angle in degrees at `pivot` between the segments to `prev` and `next`.
///
/// Computed on raw (lat, lon) vectors. Coincident points yield 180 degrees,
/// i.e. a straight continuation.
pub fn turn_angle_degrees(prev: &Node, pivot: &Node, next: &Node) -> f64 {
    let v1 = (prev.lat - pivot.lat, prev.lon - pivot.lon);
    let v2 = (next.lat - pivot.lat, next.lon - pivot.lon);

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 180.0;
    }

    let cos_angle = ((v1.0 * v2.0 + v1.1 * v2.1) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Count sharp turns along a path of dense node indices.
pub fn count_sharp_turns(graph: &Graph, path: &[usize], threshold_deg: f64) -> usize {
    path.windows(3)
        .filter(|w| {
            let angle =
                turn_angle_degrees(graph.node_at(w[0]), graph.node_at(w[1]), graph.node_at(w[2]));
            angle < threshold_deg
        })
        .count()
}

/// Trait for per-mode cost strategies.
pub trait CostModel: Send + Sync {
    /// The routing mode this model implements.
    fn mode(&self) -> RouteMode;

    /// Cost of moving `pivot -> next` over an edge of `weight` metres,
    /// having arrived at `pivot` from `arrived_from` (if any).
    fn edge_cost(
        &self,
        graph: &Graph,
        arrived_from: Option<usize>,
        pivot: usize,
        next: usize,
        weight: f64,
    ) -> f64;

    /// Lower bound on the remaining cost from `node` to `goal`.
    fn heuristic(&self, graph: &Graph, node: usize, goal: usize) -> f64;

    /// Whether `edge_cost` reads `arrived_from`.
    fn turn_aware(&self) -> bool {
        false
    }

    /// Turns reported for a finished path.
    fn count_turns(&self, _graph: &Graph, _path: &[usize]) -> usize {
        0
    }

    /// Check the model's own constants before a search uses them.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Label for the unit of `total_cost`.
    fn units(&self) -> &'static str {
        self.mode().units()
    }
}

fn straight_line(graph: &Graph, node: usize, goal: usize) -> f64 {
    graph.node_at(node).distance_to(graph.node_at(goal))
}

/// Pure distance: cost is the edge weight.
#[derive(Debug, Clone, Default)]
pub struct ShortestCost;

impl CostModel for ShortestCost {
    fn mode(&self) -> RouteMode {
        RouteMode::Shortest
    }

    fn edge_cost(&self, _: &Graph, _: Option<usize>, _: usize, _: usize, weight: f64) -> f64 {
        weight
    }

    fn heuristic(&self, graph: &Graph, node: usize, goal: usize) -> f64 {
        straight_line(graph, node, goal)
    }
}

/// Distance scaled by a uniform energy factor.
#[derive(Debug, Clone)]
pub struct EnergyCost {
    factor: f64,
}

impl EnergyCost {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Default for EnergyCost {
    fn default() -> Self {
        Self::new(ENERGY_PENALTY_FACTOR)
    }
}

impl CostModel for EnergyCost {
    fn mode(&self) -> RouteMode {
        RouteMode::EnergyEfficient
    }

    fn edge_cost(&self, _: &Graph, _: Option<usize>, _: usize, _: usize, weight: f64) -> f64 {
        weight * self.factor
    }

    fn heuristic(&self, graph: &Graph, node: usize, goal: usize) -> f64 {
        straight_line(graph, node, goal) * self.factor
    }

    fn validate(&self) -> Result<()> {
        check_energy_factor(self.factor)
    }
}

/// Distance plus a fixed penalty for every turn sharper than the threshold.
///
/// The heuristic ignores penalties; it stays admissible but is not tight.
#[derive(Debug, Clone)]
pub struct LeastTurnCost {
    penalty_m: f64,
    threshold_deg: f64,
}

impl LeastTurnCost {
    pub fn new(penalty_m: f64, threshold_deg: f64) -> Self {
        Self {
            penalty_m,
            threshold_deg,
        }
    }

    pub fn penalty_m(&self) -> f64 {
        self.penalty_m
    }

    pub fn threshold_deg(&self) -> f64 {
        self.threshold_deg
    }
}

impl Default for LeastTurnCost {
    fn default() -> Self {
        Self::new(TURN_PENALTY_M, SHARP_TURN_THRESHOLD_DEG)
    }
}

impl CostModel for LeastTurnCost {
    fn mode(&self) -> RouteMode {
        RouteMode::LeastTurn
    }

    fn edge_cost(
        &self,
        graph: &Graph,
        arrived_from: Option<usize>,
        pivot: usize,
        next: usize,
        weight: f64,
    ) -> f64 {
        let Some(prev) = arrived_from else {
            return weight;
        };
        let angle = turn_angle_degrees(graph.node_at(prev), graph.node_at(pivot), graph.node_at(next));
        if angle < self.threshold_deg {
            weight + self.penalty_m
        } else {
            weight
        }
    }

    fn heuristic(&self, graph: &Graph, node: usize, goal: usize) -> f64 {
        straight_line(graph, node, goal)
    }

    fn turn_aware(&self) -> bool {
        true
    }

    fn count_turns(&self, graph: &Graph, path: &[usize]) -> usize {
        count_sharp_turns(graph, path, self.threshold_deg)
    }

    fn validate(&self) -> Result<()> {
        check_turn_penalty(self.penalty_m)?;
        check_turn_threshold(self.threshold_deg)
    }
}

/// Select the cost model for a routing mode.
pub fn select_cost_model(mode: RouteMode, parameters: &CostParameters) -> Box<dyn CostModel> {
    match mode {
        RouteMode::Shortest => Box::new(ShortestCost),
        RouteMode::EnergyEfficient => Box::new(EnergyCost::new(parameters.energy_penalty_factor)),
        RouteMode::LeastTurn => Box::new(LeastTurnCost::new(
            parameters.turn_penalty_m,
            parameters.sharp_turn_threshold_deg,
        )),
    }
}
