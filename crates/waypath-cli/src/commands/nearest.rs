use anyhow::{anyhow, Result};

use waypath_cli::OutputFormat;
use waypath_lib::{Error as WaypathError, SnapPolicy};

use super::load_graph_arg;

/// Snap `(lat, lon)` to the closest node within `max_distance_m`.
pub fn handle_nearest(
    graph: Option<&str>,
    format: OutputFormat,
    lat: f64,
    lon: f64,
    max_distance_m: f64,
) -> Result<()> {
    let graph = load_graph_arg(graph)?;
    let snapped = match SnapPolicy::new(max_distance_m).snap(&graph, lat, lon) {
        Ok(snapped) => snapped,
        Err(WaypathError::SnapOutOfRange {
            distance_m,
            max_distance_m,
        }) => {
            return Err(anyhow!(
                "No node within {max_distance_m:.0} m of ({lat}, {lon}); the closest is {distance_m:.1} m away. Try a larger --max-snap-distance."
            ))
        }
        Err(err) => return Err(err.into()),
    };
    format.render_nearest(&snapped)
}
