//! Error taxonomy shared by every solver.

use serde::Serialize;
use thiserror::Error;

/// Failures a solver can report back to the caller.
///
/// Every variant carries a message that is safe to show to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("The graph is not bipartite; the assignment problem needs two disjoint node sets")]
    NotBipartite,

    #[error("The graph contains a cycle; this analysis needs a directed acyclic graph")]
    CyclicGraph,

    #[error("The graph has no source or no sink node")]
    NoSourceOrSink,

    #[error("No complete assignment exists; some row or column has no feasible cell left")]
    InfeasibleAssignment,

    #[error("Invalid traversal: {0}")]
    InvalidTraversal(String),

    #[error("Node not in graph: {0}")]
    SourceNotInGraph(String),

    #[error("No path exists{}", describe_endpoints(.from.as_deref(), .to.as_deref()))]
    NoPath {
        from: Option<String>,
        to: Option<String>,
    },

    #[error("Edge {0} has a negative weight, which this algorithm does not support")]
    NegativeWeight(String),
}

fn describe_endpoints(source: Option<&str>, target: Option<&str>) -> String {
    match (source, target) {
        (Some(s), Some(t)) => format!(" from {s} to {t}"),
        (Some(s), None) => format!(" from {s}"),
        (None, Some(t)) => format!(" to {t}"),
        (None, None) => " from any source to any sink".to_string(),
    }
}

impl SolverError {
    pub fn invalid_traversal(reason: impl Into<String>) -> Self {
        Self::InvalidTraversal(reason.into())
    }

    pub fn source_not_in_graph(id: impl Into<String>) -> Self {
        Self::SourceNotInGraph(id.into())
    }

    pub fn no_path(source: Option<&str>, target: Option<&str>) -> Self {
        Self::NoPath {
            from: source.map(str::to_string),
            to: target.map(str::to_string),
        }
    }

    /// Machine-readable tag for the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolverError::NotBipartite => ErrorKind::NotBipartite,
            SolverError::CyclicGraph => ErrorKind::CyclicGraph,
            SolverError::NoSourceOrSink => ErrorKind::NoSourceOrSink,
            SolverError::InfeasibleAssignment => ErrorKind::InfeasibleAssignment,
            SolverError::InvalidTraversal(_) => ErrorKind::InvalidTraversal,
            SolverError::SourceNotInGraph(_) => ErrorKind::SourceNotInGraph,
            SolverError::NoPath { .. } => ErrorKind::NoPath,
            SolverError::NegativeWeight(_) => ErrorKind::NegativeWeight,
        }
    }
}

/// Serializable failure tag, sent to the UI next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotBipartite,
    CyclicGraph,
    NoSourceOrSink,
    InfeasibleAssignment,
    InvalidTraversal,
    SourceNotInGraph,
    NoPath,
    NegativeWeight,
}

/// Result type for solver operations.
pub type SolverResult<T> = std::result::Result<T, SolverError>;
