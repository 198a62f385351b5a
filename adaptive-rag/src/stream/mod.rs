//! Streaming types for graph runs.
//!
//! `CompiledStateGraph::stream` emits one event per node (per enabled mode) as
//! soon as the node's update is applied, then closes the channel.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit full state after each node's update is applied.
    Values,
    /// Emit the node id together with the state after that node.
    Updates,
}

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Full state snapshot after a node finishes.
    Values(S),
    /// Node id and the state after that node.
    Updates { node_id: String, state: S },
    /// The run failed; no further events follow. Shared so the event stays `Clone`.
    Error(Arc<AgentError>),
}
