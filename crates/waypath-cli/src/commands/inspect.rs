use anyhow::Result;

use waypath_cli::OutputFormat;

use super::load_graph_arg;

/// Print node, edge and bounds information for the graph.
pub fn handle_inspect(graph: Option<&str>, format: OutputFormat) -> Result<()> {
    let graph = load_graph_arg(graph)?;
    format.render_graph(&graph)
}
