//! Checkpoint and metadata types.

use std::time::SystemTime;

/// Metadata for a single checkpoint (source, step, created_at).
#[derive(Debug, Clone)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Number of supersteps the run took when the checkpoint was written.
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// What produced the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointSource {
    /// Initial input before any step ran.
    Input,
    /// End of a graph run.
    Update,
}

/// One checkpoint: a state snapshot plus id/ts.
///
/// Stored by a `Checkpointer` under `(thread_id, checkpoint_ns)`; the latest one
/// for a thread is what the runner resumes from.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    pub ts: String,
    pub state: S,
    pub metadata: CheckpointMetadata,
}

/// Item returned by `Checkpointer::list` for history inspection.
#[derive(Debug, Clone)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Creates a checkpoint from the current state. Uses current time (ms) and `step` for the id.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = now
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
            .to_string();
        Self {
            id: format!("{}-{}", ts, step),
            ts,
            state,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }
}
