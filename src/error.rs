//! Engine error hierarchy.
//!
//! Graph construction and execution report `EngineError`. Operators themselves
//! return `anyhow::Result`; whatever they raise is wrapped in
//! `EngineError::OperatorExecution` together with the failing node id.

use thiserror::Error;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("pipeline graph contains a cycle: {}", .path.join(" -> "))]
    CyclicGraph { path: Vec<String> },

    #[error("cannot compose '{from}' -> '{to}': {reason}")]
    CompositionCapability {
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("operator '{id}' failed")]
    OperatorExecution {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("duplicate node id in graph: {id}")]
    DuplicateNodeId { id: String },

    #[error("graph references unregistered node: {id}")]
    UnknownNode { id: String },

    #[error("composition '{from}' -> '{to}' was not recorded in the pipeline graph")]
    UnrecordedEdge { from: String, to: String },
}

impl EngineError {
    pub(crate) fn cyclic(path: Vec<String>) -> Self {
        Self::CyclicGraph { path }
    }

    /// True for errors detected before any node ran.
    pub fn is_graph_error(&self) -> bool {
        !matches!(self, Self::OperatorExecution { .. })
    }
}
