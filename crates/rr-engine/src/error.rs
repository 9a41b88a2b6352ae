use rr_core::{CoreError, NodeId};
use rr_graph::GraphError;
use thiserror::Error;

/// Failure of the geocoding collaborator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("no unambiguous location for {0:?}")]
    AmbiguousOrNotFound(String),

    #[error("geocoder unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a [`GraphProvider`](crate::GraphProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no road graph available for {0:?}")]
    UnknownPlace(String),

    #[error("failed to load road graph for {place:?}: {source}")]
    Load {
        place:  String,
        #[source]
        source: GraphError,
    },
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("node not found in graph: {0}")]
    NotFound(NodeId),

    #[error("road graph has no nodes")]
    EmptyGraph,

    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("no path from {from} to {to}")]
    NoPathFound { from: NodeId, to: NodeId },

    #[error("routing cancelled")]
    Cancelled,

    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("graph provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("graph error: {0}")]
    Graph(GraphError),
}

impl RouteError {
    /// `true` for the expected "target unreachable" outcome, as opposed to
    /// malformed input or collaborator failures.
    pub fn is_no_path(&self) -> bool {
        matches!(self, RouteError::NoPathFound { .. })
    }
}

impl From<GraphError> for RouteError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::NodeNotFound(n) => RouteError::NotFound(n),
            GraphError::EmptyGraph      => RouteError::EmptyGraph,
            GraphError::Cancelled       => RouteError::Cancelled,
            GraphError::InvalidCoordinate { lat, lon } => RouteError::InvalidCoordinate { lat, lon },
            other                       => RouteError::Graph(other),
        }
    }
}

pub type RouteResult<T> = Result<T, RouteError>;
