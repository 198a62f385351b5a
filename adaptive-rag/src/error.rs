//! Step execution error types.
//!
//! Returned by `Node::run`, `LlmClient::invoke` and graph execution.

use std::time::Duration;

use thiserror::Error;

use crate::memory::{CheckpointError, StoreError};

/// Step execution error.
///
/// Covers external-call failures (LLM, vector store), timeouts and runtime
/// guards. Malformed model output is never an error: each call site parses it
/// into a closed enum with a default.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, task panicked).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Vector store or embedding failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Saving or loading a checkpoint failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// An external call did not complete within the configured timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The graph ran more supersteps than allowed.
    #[error("recursion limit of {0} supersteps reached")]
    RecursionLimit(usize),
}
