use std::fmt::Write;

use serde::Serialize;

use crate::graph::NodeId;
use crate::result::RouteResult;
use crate::routing::RouteMode;

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    Compact,
}

/// Step taken along a rendered route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

/// Display-oriented view of a [`RouteResult`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub mode: RouteMode,
    pub hops: usize,
    pub total_distance_m: f64,
    pub total_cost: f64,
    pub units: String,
    pub turn_count: usize,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    pub fn from_result(result: &RouteResult) -> Self {
        let steps = result
            .path_node_ids
            .iter()
            .zip(&result.path_coords)
            .enumerate()
            .map(|(index, (&id, &[lat, lon]))| RouteStep { index, id, lat, lon })
            .collect();

        Self {
            mode: result.mode,
            hops: result.hop_count(),
            total_distance_m: result.total_distance_m,
            total_cost: result.total_cost,
            units: result.cost_units.clone(),
            turn_count: result.turn_count,
            steps,
        }
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::Compact => self.render_compact(),
        }
    }

    fn header(&self, buffer: &mut String) {
        let _ = writeln!(
            buffer,
            "Route ({}): {} hops, {:.1} m, cost {:.1} {}, {} turns",
            self.mode, self.hops, self.total_distance_m, self.total_cost, self.units, self.turn_count
        );
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        self.header(&mut buffer);
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>3}: {} ({:.6}, {:.6})",
                step.index, step.id, step.lat, step.lon
            );
        }
        buffer
    }

    fn render_compact(&self) -> String {
        let mut buffer = String::new();
        self.header(&mut buffer);
        let joined = self
            .steps
            .iter()
            .map(|step| step.id.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        let _ = writeln!(buffer, "{joined}");
        buffer
    }
}

impl From<&RouteResult> for RouteSummary {
    fn from(result: &RouteResult) -> Self {
        RouteSummary::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RouteResult {
        RouteResult {
            mode: RouteMode::LeastTurn,
            path_node_ids: vec![3, 8, 5],
            path_coords: vec![[1.0, 2.0], [1.5, 2.0], [1.5, 2.5]],
            total_distance_m: 240.0,
            total_cost: 290.0,
            cost_units: "meters_with_turn_penalty".to_string(),
            turn_count: 1,
        }
    }

    #[test]
    fn plain_text_lists_every_node() {
        let text = RouteSummary::from_result(&sample()).render(RouteRenderMode::PlainText);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Route (least_turn): 2 hops, 240.0 m, cost 290.0 meters_with_turn_penalty, 1 turns"
        );
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "  1: 8 (1.500000, 2.000000)");
    }

    #[test]
    fn compact_joins_ids() {
        let text = RouteSummary::from(&sample()).render(RouteRenderMode::Compact);
        assert!(text.ends_with("3 -> 8 -> 5\n"));
        assert_eq!(text.lines().count(), 2);
    }
}
