//! Invoke config: thread_id, checkpoint_id, checkpoint_ns.
//!
//! Passed to `CompiledStateGraph::invoke` and to `Checkpointer` calls.

/// Config for a single invoke. Identifies the session (thread) and optional checkpoint.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke(state, config)` and
/// `Checkpointer::put` / `get_tuple` / `list`. The CLI maps `--session` to `thread_id`.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Session id. Required when using a checkpointer.
    pub thread_id: Option<String>,
    /// If set, load this checkpoint instead of the latest.
    pub checkpoint_id: Option<String>,
    /// Optional namespace for checkpoints. Default is empty.
    pub checkpoint_ns: String,
}

impl RunnableConfig {
    /// Config for the given session id.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }
}
