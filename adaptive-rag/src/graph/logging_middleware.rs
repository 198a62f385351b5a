//! Node middleware that logs enter/exit (with elapsed time) around each node run.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::node_middleware::{NodeMiddleware, NodeOutput, NodeRunFn};
use super::GraphState;

/// Logs node enter/exit at `info` through `tracing`; output goes wherever the
/// subscriber writes (stderr in the CLI), so answers on stdout stay clean.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNodeMiddleware;

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware
where
    S: GraphState,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: Arc<S>,
        inner: NodeRunFn<S>,
    ) -> NodeOutput<S> {
        tracing::info!(node = node_id, "enter");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok((_, next)) => tracing::info!(node = node_id, ?next, elapsed_ms, "exit"),
            Err(e) => tracing::warn!(node = node_id, error = %e, elapsed_ms, "exit with error"),
        }
        result
    }
}
