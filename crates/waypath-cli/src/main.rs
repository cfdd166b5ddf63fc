mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use waypath_cli::{parse_endpoint, parse_mode, parse_snap_distance, OutputFormat};
use waypath_lib::{Endpoint, RouteMode, MANUAL_SNAP_DISTANCE_M};

use crate::commands::{handle_inspect, handle_nearest, handle_route, RouteCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Walking route planner for campus graphs")]
struct Cli {
    /// Graph JSON to route on: a file path or an http(s) URL.
    #[arg(long, global = true)]
    graph: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a route between two node ids or coordinates.
    Route(RouteArgs),
    /// Snap a coordinate to the nearest graph node.
    Nearest(NearestArgs),
    /// Summarise the loaded graph.
    Inspect,
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Start node id or `lat,lon`.
    #[arg(long = "from", value_parser = parse_endpoint, allow_hyphen_values = true)]
    from: Endpoint,
    /// Destination node id or `lat,lon`.
    #[arg(long = "to", value_parser = parse_endpoint, allow_hyphen_values = true)]
    to: Endpoint,
    /// Optimisation criterion: shortest, energy_efficient or least_turn.
    #[arg(long, value_parser = parse_mode, default_value = "shortest")]
    mode: RouteMode,
    /// Reject coordinate endpoints further than this from any node, in metres.
    #[arg(long, value_parser = parse_snap_distance, default_value_t = MANUAL_SNAP_DISTANCE_M)]
    max_snap_distance: f64,
    /// Give up after expanding this many search states.
    #[arg(long)]
    max_expansions: Option<usize>,
    /// Print node ids on a single line.
    #[arg(long)]
    compact: bool,
}

#[derive(Args, Debug)]
struct NearestArgs {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Maximum accepted distance to the node, in metres.
    #[arg(long, value_parser = parse_snap_distance, default_value_t = MANUAL_SNAP_DISTANCE_M)]
    max_snap_distance: f64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let graph = cli.graph.as_deref();

    match cli.command {
        Command::Route(args) => handle_route(
            graph,
            cli.format,
            &RouteCommandArgs {
                from: args.from,
                to: args.to,
                mode: args.mode,
                max_snap_distance: args.max_snap_distance,
                max_expansions: args.max_expansions,
                compact: args.compact,
            },
        ),
        Command::Nearest(args) => handle_nearest(
            graph,
            cli.format,
            args.lat,
            args.lon,
            args.max_snap_distance,
        ),
        Command::Inspect => handle_inspect(graph, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
