//! Application state shared by axum handlers.
//!
//! Holds the process-wide [`GraphCache`] plus an optional default graph that
//! is loaded at startup and used by requests that omit `map_url`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use waypath_lib::{
    load_graph_file, Error as LibError, Graph, GraphCache, GraphSource,
    DEFAULT_GRAPH_CACHE_CAPACITY,
};

use crate::metrics::failure_reason;
use crate::problem::{from_lib_error, ProblemDetails};

/// Startup configuration for [`AppState`].
#[derive(Debug, Clone)]
pub struct StateConfig {
    /// Graph preloaded at startup.
    pub graph_path: Option<PathBuf>,
    /// Directory local `map_url` paths must resolve into. `None` allows only
    /// the preloaded graph.
    pub graph_dir: Option<PathBuf>,
    /// Whether requests may name `http(s)` graph URLs.
    pub allow_remote_graphs: bool,
    /// Loaded graphs kept in memory before the least recently used is dropped.
    pub graph_cache_capacity: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            graph_path: None,
            graph_dir: None,
            allow_remote_graphs: true,
            graph_cache_capacity: DEFAULT_GRAPH_CACHE_CAPACITY,
        }
    }
}

impl StateConfig {
    /// Read configuration from the environment.
    ///
    /// - `WAYPATH_GRAPH_PATH`: graph file to preload (optional)
    /// - `WAYPATH_GRAPH_DIR`: directory local `map_url` paths are served from (optional)
    /// - `WAYPATH_ALLOW_REMOTE_GRAPHS`: "false" disables URL graphs (default: true)
    /// - `WAYPATH_GRAPH_CACHE_CAPACITY`: loaded graphs kept in memory (default: 16)
    pub fn from_env() -> Self {
        let path_var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        let allow_remote_graphs = std::env::var("WAYPATH_ALLOW_REMOTE_GRAPHS")
            .map(|v| v.trim().to_lowercase() != "false")
            .unwrap_or(true);
        let graph_cache_capacity = std::env::var("WAYPATH_GRAPH_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_GRAPH_CACHE_CAPACITY);

        Self {
            graph_path: path_var("WAYPATH_GRAPH_PATH"),
            graph_dir: path_var("WAYPATH_GRAPH_DIR"),
            allow_remote_graphs,
            graph_cache_capacity,
        }
    }
}

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The configured graph file does not exist.
    GraphNotFound(String),

    /// The configured graph directory does not exist.
    GraphDirNotFound(String),

    /// The configured graph file could not be read or validated.
    GraphLoad(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphNotFound(path) => write!(f, "graph file not found: {}", path),
            Self::GraphDirNotFound(path) => write!(f, "graph directory not found: {}", path),
            Self::GraphLoad(e) => write!(f, "failed to load graph: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GraphLoad(e) => Some(e),
            Self::GraphNotFound(_) | Self::GraphDirNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::GraphLoad(err)
    }
}

/// Why a request could not be given a graph.
#[derive(Debug)]
pub enum GraphAccessError {
    /// No `map_url` and no default graph.
    NoGraph,
    /// `map_url` is remote but remote graphs are disabled.
    RemoteDisabled(String),
    /// `map_url` is a local path outside the graph directory.
    LocalPathDenied(String),
    /// Loading the named graph failed.
    Load(LibError),
}

impl GraphAccessError {
    /// Label for the `reason` metric dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoGraph | Self::RemoteDisabled(_) | Self::LocalPathDenied(_) => {
                "validation_error"
            }
            Self::Load(err) => failure_reason(err),
        }
    }

    pub fn to_problem(&self, request_id: &str) -> ProblemDetails {
        match self {
            Self::NoGraph => ProblemDetails::bad_request(
                "The 'map_url' field is required when no default graph is loaded",
                request_id,
            ),
            Self::RemoteDisabled(url) => ProblemDetails::bad_request(
                format!("Remote graphs are disabled on this service: {url}"),
                request_id,
            ),
            Self::LocalPathDenied(path) => ProblemDetails::bad_request(
                format!("Local graph paths must be inside the graph directory: {path}"),
                request_id,
            ),
            Self::Load(err) => from_lib_error(err, request_id),
        }
    }
}

impl std::fmt::Display for GraphAccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoGraph => write!(f, "no map_url given and no default graph loaded"),
            Self::RemoteDisabled(url) => write!(f, "remote graphs are disabled: {}", url),
            Self::LocalPathDenied(path) => write!(f, "local graph path not allowed: {}", path),
            Self::Load(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GraphAccessError {}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; share it through axum's `State` extractor.
///
/// ```ignore
/// use axum::{extract::State, routing::post, Router};
/// use waypath_service_shared::{AppState, StateConfig};
///
/// async fn handler(State(state): State<AppState>) {
///     let graph = state.graph_for(None);
/// }
///
/// let state = AppState::from_config(&StateConfig::from_env()).unwrap();
/// let app: Router = Router::new()
///     .route("/api/v1/route", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graphs: GraphCache,
    default_graph: Option<DefaultGraph>,
    graph_dir: Option<PathBuf>,
    allow_remote_graphs: bool,
}

struct DefaultGraph {
    key: String,
    graph: Arc<Graph>,
}

impl AppState {
    /// Build state from configuration, preloading the default graph if one is set.
    pub fn from_config(config: &StateConfig) -> Result<Self, AppStateError> {
        let graphs = GraphCache::with_capacity(config.graph_cache_capacity);
        let default_graph = match &config.graph_path {
            Some(path) => Some(preload(&graphs, path)?),
            None => None,
        };
        let graph_dir = match &config.graph_dir {
            Some(dir) => Some(
                dir.canonicalize()
                    .map_err(|_| AppStateError::GraphDirNotFound(dir.display().to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                graphs,
                default_graph,
                graph_dir,
                allow_remote_graphs: config.allow_remote_graphs,
            }),
        })
    }

    /// Load `path` as the default graph and allow remote graphs.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        Self::from_config(&StateConfig {
            graph_path: Some(path.as_ref().to_path_buf()),
            ..StateConfig::default()
        })
    }

    /// Resolve the graph a request should use.
    ///
    /// Local paths are served only when they name the preloaded graph or
    /// resolve inside the configured graph directory.
    ///
    /// Blocking: URL graphs are fetched with a blocking client, so call this
    /// from `spawn_blocking` inside async handlers.
    pub fn graph_for(&self, map_url: Option<&str>) -> Result<Arc<Graph>, GraphAccessError> {
        let Some(map_url) = map_url.map(str::trim) else {
            return self
                .inner
                .default_graph
                .as_ref()
                .map(|default| Arc::clone(&default.graph))
                .ok_or(GraphAccessError::NoGraph);
        };

        let key = match GraphSource::from(map_url) {
            GraphSource::Url(url) => {
                if !self.inner.allow_remote_graphs {
                    return Err(GraphAccessError::RemoteDisabled(url));
                }
                url
            }
            GraphSource::File(path) => {
                if let Some(default) = &self.inner.default_graph {
                    if default.key == cache_key(&path) {
                        return Ok(Arc::clone(&default.graph));
                    }
                }
                self.local_key(&path)?
            }
        };

        self.inner
            .graphs
            .get_or_load(&key)
            .map_err(GraphAccessError::Load)
    }

    /// Resolve `path` against the graph directory, refusing anything outside it.
    fn local_key(&self, path: &Path) -> Result<String, GraphAccessError> {
        let denied = || GraphAccessError::LocalPathDenied(path.display().to_string());
        let dir = self.inner.graph_dir.as_ref().ok_or_else(denied)?;

        let candidate = if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        };
        // Missing files resolve through their parent so the load reports them
        // as unavailable instead of leaking whether they exist elsewhere.
        let resolved = match candidate.canonicalize() {
            Ok(real) => real,
            Err(_) => match (candidate.parent(), candidate.file_name()) {
                (Some(parent), Some(name)) => parent
                    .canonicalize()
                    .map_err(|_| denied())?
                    .join(name),
                _ => return Err(denied()),
            },
        };

        if resolved.starts_with(dir) {
            Ok(resolved.to_string_lossy().into_owned())
        } else {
            debug!(path = %path.display(), "local graph path outside graph directory");
            Err(denied())
        }
    }

    pub fn has_default_graph(&self) -> bool {
        self.inner.default_graph.is_some()
    }

    pub fn cached_graph_count(&self) -> usize {
        self.inner.graphs.len()
    }

    pub fn graph_cache_capacity(&self) -> usize {
        self.inner.graphs.capacity()
    }

    pub fn allows_remote_graphs(&self) -> bool {
        self.inner.allow_remote_graphs
    }
}

/// Canonical string for an existing path, the path as given otherwise.
fn cache_key(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn preload(graphs: &GraphCache, path: &Path) -> Result<DefaultGraph, AppStateError> {
    if !path.exists() {
        return Err(AppStateError::GraphNotFound(path.display().to_string()));
    }

    let key = cache_key(path);
    let graph = graphs.get_or_load_with(&key, || load_graph_file(path))?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "default graph loaded"
    );
    Ok(DefaultGraph { key, graph })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixture_graph_path, fixtures_dir};

    fn state_with_graph_dir() -> AppState {
        AppState::from_config(&StateConfig {
            graph_dir: Some(fixtures_dir()),
            ..StateConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn missing_graph_file_is_reported() {
        let config = StateConfig {
            graph_path: Some(PathBuf::from("/nonexistent/campus.json")),
            ..StateConfig::default()
        };
        let err = AppState::from_config(&config).err().unwrap();
        assert!(matches!(err, AppStateError::GraphNotFound(_)));
        assert!(err.to_string().contains("/nonexistent/campus.json"));
    }

    #[test]
    fn missing_graph_dir_is_reported() {
        let config = StateConfig {
            graph_dir: Some(PathBuf::from("/nonexistent/maps")),
            ..StateConfig::default()
        };
        let err = AppState::from_config(&config).err().unwrap();
        assert!(matches!(err, AppStateError::GraphDirNotFound(_)));
    }

    #[test]
    fn state_without_default_graph_needs_map_url() {
        let state = AppState::from_config(&StateConfig::default()).unwrap();
        assert!(!state.has_default_graph());
        assert_eq!(state.cached_graph_count(), 0);

        let err = state.graph_for(None).err().unwrap();
        assert!(matches!(err, GraphAccessError::NoGraph));
        assert_eq!(err.to_problem("req").status, 400);
    }

    #[test]
    fn default_graph_is_cached_and_reused() {
        let state = AppState::load(fixture_graph_path()).unwrap();
        assert!(state.has_default_graph());
        assert_eq!(state.cached_graph_count(), 1);

        let default = state.graph_for(None).unwrap();
        let by_path = state
            .graph_for(Some(&fixture_graph_path().to_string_lossy()))
            .unwrap();
        assert!(Arc::ptr_eq(&default, &by_path));
        assert_eq!(state.cached_graph_count(), 1);
    }

    #[test]
    fn remote_graphs_can_be_disabled() {
        let state = AppState::from_config(&StateConfig {
            allow_remote_graphs: false,
            ..StateConfig::default()
        })
        .unwrap();

        let err = state
            .graph_for(Some("https://maps.example.edu/campus.json"))
            .err()
            .unwrap();
        assert!(matches!(err, GraphAccessError::RemoteDisabled(_)));
        assert_eq!(err.reason(), "validation_error");
    }

    #[test]
    fn local_paths_need_a_graph_dir() {
        let state = AppState::load(fixture_graph_path()).unwrap();
        let err = state.graph_for(Some("/etc/hostname")).err().unwrap();
        assert!(matches!(err, GraphAccessError::LocalPathDenied(_)));
        assert_eq!(err.to_problem("req").status, 400);
        assert_eq!(state.cached_graph_count(), 1);
    }

    #[test]
    fn local_paths_cannot_escape_graph_dir() {
        let state = state_with_graph_dir();
        for path in ["/etc/hostname", "../../Cargo.toml", "/nonexistent/dir/campus.json"] {
            let err = state.graph_for(Some(path)).err().unwrap();
            assert!(
                matches!(err, GraphAccessError::LocalPathDenied(_)),
                "{path}: {err:?}"
            );
        }
        assert_eq!(state.cached_graph_count(), 0);
    }

    #[test]
    fn relative_paths_resolve_inside_graph_dir() {
        let state = state_with_graph_dir();
        let relative = state.graph_for(Some("campus_graph.json")).unwrap();
        let absolute = state
            .graph_for(Some(&fixture_graph_path().to_string_lossy()))
            .unwrap();
        assert!(Arc::ptr_eq(&relative, &absolute));
        assert_eq!(state.cached_graph_count(), 1);
    }

    #[test]
    fn unreadable_local_graph_maps_to_bad_gateway() {
        let state = state_with_graph_dir();
        let err = state.graph_for(Some("missing_campus.json")).err().unwrap();
        assert_eq!(err.reason(), "graph_unavailable");
        assert_eq!(err.to_problem("req").status, 502);
        assert_eq!(state.cached_graph_count(), 0);
    }

    #[test]
    fn cache_capacity_comes_from_config() {
        let state = AppState::from_config(&StateConfig {
            graph_cache_capacity: 3,
            ..StateConfig::default()
        })
        .unwrap();
        assert_eq!(state.graph_cache_capacity(), 3);
        assert_eq!(
            AppState::from_config(&StateConfig::default())
                .unwrap()
                .graph_cache_capacity(),
            DEFAULT_GRAPH_CACHE_CAPACITY
        );
    }
}
