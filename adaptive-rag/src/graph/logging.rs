//! Structured logging for graph execution: run, superstep and node events.

use crate::error::AgentError;
use crate::graph::Next;

pub(crate) fn log_graph_start(entry: &str) {
    tracing::debug!(entry, "graph run started");
}

pub(crate) fn log_superstep(step: usize, active: &[String]) {
    tracing::trace!(step, ?active, "superstep");
}

pub(crate) fn log_node_start(node_id: &str) {
    tracing::debug!(node_id, "node started");
}

pub(crate) fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id, ?next, "node complete");
}

pub(crate) fn log_graph_complete(steps: usize) {
    tracing::debug!(steps, "graph run complete");
}

pub(crate) fn log_graph_error(error: &AgentError) {
    tracing::error!(%error, "graph run failed");
}
