//! Node trait: one step of a graph.

use async_trait::async_trait;

use crate::error::AgentError;

use super::{GraphState, Next};

/// One step of a graph: reads the state snapshot, returns a partial update.
///
/// **Interaction**: Registered with `StateGraph::add_node` as `Arc<dyn Node<S>>`.
/// `CompiledStateGraph` calls `run` with the superstep snapshot; nodes scheduled
/// in the same superstep run as separate tokio tasks, so `run` must not rely on
/// seeing their writes.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: GraphState,
{
    /// Node id, used in logs, stream events and the execution path.
    fn id(&self) -> &str;

    /// Runs the step.
    async fn run(&self, state: &S) -> Result<(S::Update, Next), AgentError>;
}
