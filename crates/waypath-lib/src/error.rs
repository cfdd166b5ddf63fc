use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the waypath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a start or end node id does not exist in the graph.
    #[error("node {id} does not exist in the graph")]
    InvalidEndpoint { id: NodeId },

    /// Raised when the start node's component does not reach the goal.
    #[error("no path found between node {start} and node {goal}")]
    NoPathFound { start: NodeId, goal: NodeId },

    /// Raised when an input graph is structurally invalid.
    #[error("malformed graph: {reason}")]
    MalformedGraph { reason: String },

    /// Raised when a routing mode name is not recognised.
    #[error("unknown routing mode '{mode}'; expected shortest, energy_efficient or least_turn")]
    UnknownMode { mode: String },

    /// Raised when a nearest-node query runs against a graph without nodes.
    #[error("graph contains no nodes")]
    EmptyGraph,

    /// Raised when the closest node is further away than the snap policy allows.
    #[error("nearest node is {distance_m:.1} m away, beyond the {max_distance_m:.1} m snap limit")]
    SnapOutOfRange { distance_m: f64, max_distance_m: f64 },

    /// Raised when cost parameters would break the search (negative, zero or NaN).
    #[error("invalid cost parameters: {reason}")]
    InvalidParameters { reason: String },

    /// Raised when a search was aborted by its expansion cap.
    #[error("search from node {start} to node {goal} aborted after {expansions} expansions")]
    SearchLimitExceeded {
        start: NodeId,
        goal: NodeId,
        expansions: usize,
    },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for graph JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether this error means "no route", including searches cut short by a limit.
    pub fn is_no_path(&self) -> bool {
        matches!(
            self,
            Error::NoPathFound { .. } | Error::SearchLimitExceeded { .. }
        )
    }

    pub(crate) fn invalid_parameters(reason: impl Into<String>) -> Self {
        Error::InvalidParameters {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedGraph {
            reason: reason.into(),
        }
    }
}
