// Subcommand handlers. main.rs parses arguments and dispatches here.

mod inspect;
mod nearest;
mod route;

pub use inspect::handle_inspect;
pub use nearest::handle_nearest;
pub use route::{handle_route, RouteCommandArgs};

use anyhow::{bail, Context, Result};
use waypath_lib::{load_graph, Graph, GraphSource};

/// Environment variable consulted when `--graph` is omitted.
pub const GRAPH_PATH_ENV: &str = "WAYPATH_GRAPH_PATH";

/// Load the graph named by `--graph` or the `WAYPATH_GRAPH_PATH` environment variable.
pub(crate) fn load_graph_arg(graph: Option<&str>) -> Result<Graph> {
    let raw = match graph {
        Some(value) => value.to_string(),
        None => match std::env::var(GRAPH_PATH_ENV) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => bail!("no graph given; pass --graph <path-or-url> or set {GRAPH_PATH_ENV}"),
        },
    };

    let source = GraphSource::from(raw.as_str());
    load_graph(&source).with_context(|| format!("failed to load graph from {source}"))
}
