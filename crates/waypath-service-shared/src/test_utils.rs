//! Test fixtures for handler tests: an [`AppState`] preloaded with the
//! campus grid graph and serving local graphs from the fixtures directory.

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::state::{AppState, StateConfig};

/// Directory holding the fixture graphs.
pub const TEST_FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures");

/// Path to the campus fixture graph.
pub const TEST_FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../docs/fixtures/campus_graph.json"
);

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Shared test state with the fixture as its default graph and the fixtures
/// directory as its graph directory.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            let path = fixture_graph_path();
            let config = StateConfig {
                graph_path: Some(path.clone()),
                graph_dir: Some(fixtures_dir()),
                ..StateConfig::default()
            };
            AppState::from_config(&config)
                .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e))
        })
        .clone()
}

pub fn fixture_graph_path() -> PathBuf {
    PathBuf::from(TEST_FIXTURE_PATH)
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(TEST_FIXTURE_DIR)
}

/// Node ids in the campus fixture.
pub mod fixture_nodes {
    /// South-west corner of the 4x4 grid.
    pub const SOUTH_WEST: i64 = 1;
    /// North-east corner, opposite [`SOUTH_WEST`].
    pub const NORTH_EAST: i64 = 16;
    /// Far end of the diagonal footpath from node 6.
    pub const DIAGONAL_END: i64 = 11;
    /// Member of the two-node island, unreachable from the grid.
    pub const ISLAND: i64 = 100;
    /// Referenced by a dangling edge but never defined.
    pub const MISSING: i64 = 999;
}

pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}
