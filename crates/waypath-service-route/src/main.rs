//! Walking route planning HTTP microservice.
//!
//! # Configuration
//!
//! - `WAYPATH_GRAPH_PATH` - graph JSON preloaded at startup (optional)
//! - `WAYPATH_GRAPH_DIR` - directory local `map_url` paths may name (optional)
//! - `WAYPATH_ALLOW_REMOTE_GRAPHS` - "false" rejects http(s) `map_url`s
//! - `WAYPATH_GRAPH_CACHE_CAPACITY` - loaded graphs kept in memory (default: 16)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - log filter (default: info)
//! - `LOG_FORMAT` - json (default) or text
//! - `METRICS_ENABLED` - "false" disables the Prometheus recorder

use std::env;
use std::net::SocketAddr;

use tracing::{error, info};

use waypath_service_route::router;
use waypath_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, StateConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env().with_service("route"));

    if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
        tracing::warn!(error = %e, "continuing without metrics");
    }

    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let config = StateConfig::from_env();
    info!(
        graph_path = ?config.graph_path,
        graph_dir = ?config.graph_dir,
        graph_cache_capacity = config.graph_cache_capacity,
        allow_remote_graphs = config.allow_remote_graphs,
        port,
        "starting route service"
    );

    let state = AppState::from_config(&config).map_err(|e| {
        error!(error = %e, "failed to load application state");
        e
    })?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
