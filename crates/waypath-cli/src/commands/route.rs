//! Route command handler.

use anyhow::{anyhow, Result};

use waypath_cli::OutputFormat;
use waypath_lib::{
    plan_route, Endpoint, Error as RouteError, RouteMode, RouteRequest, SearchLimits, SnapPolicy,
};

use super::load_graph_arg;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub from: Endpoint,
    pub to: Endpoint,
    pub mode: RouteMode,
    /// Snap limit for coordinate endpoints, in metres.
    pub max_snap_distance: f64,
    pub max_expansions: Option<usize>,
    pub compact: bool,
}

impl RouteCommandArgs {
    /// Convert CLI args to a library RouteRequest.
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest::new(self.from, self.to, self.mode)
            .with_snap_policy(SnapPolicy::new(self.max_snap_distance))
            .with_limits(SearchLimits {
                max_expansions: self.max_expansions,
            })
    }
}

/// Handle the route subcommand.
pub fn handle_route(graph: Option<&str>, format: OutputFormat, args: &RouteCommandArgs) -> Result<()> {
    let graph = load_graph_arg(graph)?;
    let request = args.to_request();

    let route = match plan_route(&graph, &request) {
        Ok(route) => route,
        Err(err) => return Err(handle_route_failure(args, err)),
    };

    format.render_route(&route, args.compact)
}

fn handle_route_failure(args: &RouteCommandArgs, err: RouteError) -> anyhow::Error {
    match err {
        RouteError::InvalidEndpoint { id } => anyhow!("Node {id} is not in the graph."),
        RouteError::NoPathFound { start, goal } => {
            let mut message = format!("No route found between {start} and {goal}.");
            if args.max_expansions.is_some() {
                message.push_str(" The search limit may have been reached; try a larger --max-expansions.");
            } else {
                message.push_str(" The nodes are not connected in this graph.");
            }
            anyhow!(message)
        }
        RouteError::SnapOutOfRange {
            distance_m,
            max_distance_m,
        } => anyhow!(
            "A coordinate endpoint is {distance_m:.1} m from the nearest node, beyond the {max_distance_m:.0} m limit. Try a larger --max-snap-distance."
        ),
        other => anyhow::Error::new(other),
    }
}
