//! Output formatting for route, nearest-node and graph summaries.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use waypath_lib::{Endpoint, Graph, RouteMode, RouteRenderMode, RouteResult, RouteSummary, Snapped};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Serialize)]
struct NearestOutput {
    node_id: i64,
    lat: f64,
    lon: f64,
    distance_m: f64,
}

#[derive(Serialize)]
struct GraphOutput<'a> {
    nodes: usize,
    edges: usize,
    skipped_edges: usize,
    bounds: &'a [[f64; 2]],
}

impl OutputFormat {
    pub fn render_route(self, route: &RouteResult, compact: bool) -> anyhow::Result<()> {
        match self {
            OutputFormat::Text => {
                let mode = if compact {
                    RouteRenderMode::Compact
                } else {
                    RouteRenderMode::PlainText
                };
                write_text(&RouteSummary::from_result(route).render(mode))
            }
            OutputFormat::Json => write_json(route),
        }
    }

    pub fn render_nearest(self, snapped: &Snapped<'_>) -> anyhow::Result<()> {
        let out = NearestOutput {
            node_id: snapped.node.id,
            lat: snapped.node.lat,
            lon: snapped.node.lon,
            distance_m: snapped.distance_m,
        };
        match self {
            OutputFormat::Text => write_text(&format!(
                "Nearest node: {} ({:.6}, {:.6}), {:.1} m away\n",
                out.node_id, out.lat, out.lon, out.distance_m
            )),
            OutputFormat::Json => write_json(&out),
        }
    }

    pub fn render_graph(self, graph: &Graph) -> anyhow::Result<()> {
        let out = GraphOutput {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            skipped_edges: graph.skipped_edges(),
            bounds: graph.bounds(),
        };
        match self {
            OutputFormat::Text => {
                let mut text = format!(
                    "Nodes: {}\nEdges: {}\nSkipped edges: {}\n",
                    out.nodes, out.edges, out.skipped_edges
                );
                if let [[min_lat, min_lon], [max_lat, max_lon]] = out.bounds {
                    text.push_str(&format!(
                        "Bounds: ({min_lat:.6}, {min_lon:.6}) - ({max_lat:.6}, {max_lon:.6})\n"
                    ));
                }
                write_text(&text)
            }
            OutputFormat::Json => write_json(&out),
        }
    }
}

fn write_text(text: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Parse a route endpoint: a node id (`42`) or a coordinate (`12.97,77.59`).
pub fn parse_endpoint(raw: &str) -> Result<Endpoint, String> {
    let raw = raw.trim();
    if let Some((lat, lon)) = raw.split_once(',') {
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude in '{raw}'"))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude in '{raw}'"))?;
        return Ok(Endpoint::Coordinate { lat, lon });
    }
    raw.parse::<i64>()
        .map(Endpoint::Node)
        .map_err(|_| format!("expected a node id or 'lat,lon', got '{raw}'"))
}

/// Parse a routing mode name, accepting hyphenated spellings.
pub fn parse_mode(raw: &str) -> Result<RouteMode, String> {
    raw.parse::<RouteMode>().map_err(|err| err.to_string())
}

/// Parse a snap distance in metres; must be finite and positive.
pub fn parse_snap_distance(raw: &str) -> Result<f64, String> {
    let distance: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("expected a distance in metres, got '{raw}'"))?;
    if distance.is_finite() && distance > 0.0 {
        Ok(distance)
    } else {
        Err(format!("snap distance must be a positive number of metres, got '{raw}'"))
    }
}
