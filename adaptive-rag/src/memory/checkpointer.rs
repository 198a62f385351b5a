//! Checkpointer trait and error type.

use async_trait::async_trait;
use thiserror::Error;

use super::{Checkpoint, CheckpointListItem, CheckpointMetadata, RunnableConfig};

/// Checkpoint storage failure.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The config has no thread_id.
    #[error("thread_id is required")]
    ThreadIdRequired,
    /// A specific checkpoint_id was requested but does not exist.
    #[error("checkpoint not found: {0}")]
    NotFound(String),
    /// Backend failure.
    #[error("checkpoint storage error: {0}")]
    Storage(String),
}

/// Saves and loads state snapshots per session.
///
/// **Interaction**: `CompiledStateGraph` calls `put` after a run when
/// `config.thread_id` is set; `AdaptiveRagRunner` calls `get_tuple` to resume.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Stores a checkpoint for `config.thread_id`; returns its id.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError>;

    /// Returns the checkpoint named by `config.checkpoint_id`, or the latest one.
    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError>;

    /// Lists checkpoints for the thread, newest first.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}
