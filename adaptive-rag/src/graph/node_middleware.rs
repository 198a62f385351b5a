//! Middleware wrapped around every node run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;

use super::{GraphState, Next};

/// Result of one node run.
pub type NodeOutput<S> = Result<(<S as GraphState>::Update, Next), AgentError>;

/// The wrapped node call handed to [`NodeMiddleware::around_run`].
pub type NodeRunFn<S> =
    Box<dyn FnOnce(Arc<S>) -> Pin<Box<dyn Future<Output = NodeOutput<S>> + Send>> + Send>;

/// Wraps each node run (logging, timing, tracing spans).
///
/// Set at compile time with `StateGraph::compile_with_middleware` or
/// `StateGraph::with_middleware`. Implementations must call `inner` at most once
/// and should return its result unchanged.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: GraphState,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: Arc<S>,
        inner: NodeRunFn<S>,
    ) -> NodeOutput<S>;
}
