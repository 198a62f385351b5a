//! Graph compilation error.

use thiserror::Error;

/// Error when compiling a state graph.
///
/// Returned by `StateGraph::compile*`. Validation checks that every referenced
/// node exists, there is exactly one entry edge, some path reaches END, no node
/// mixes static and conditional edges, joins have at least two sources and
/// every node is reachable from START.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge, router path or join was not registered via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START, or more than one such edge.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// No edge, router path or jump target leads to END.
    #[error("graph has no edge to END")]
    MissingEnd,

    /// Structural problem (static and conditional edges on one node, short join, ...).
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A registered node cannot be reached from START.
    #[error("node unreachable from START: {0}")]
    Unreachable(String),
}
