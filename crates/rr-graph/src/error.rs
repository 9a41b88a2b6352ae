//! Graph-subsystem error type.

use thiserror::Error;

use rr_core::NodeId;

/// Errors produced by `rr-graph`.
///
/// "No path between two nodes" is **not** an error here: the
/// router returns `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("route search cancelled")]
    Cancelled,

    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    #[error("invalid traffic profile: {0}")]
    InvalidProfile(String),

    #[error("graph parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
