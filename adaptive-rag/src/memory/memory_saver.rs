//! In-memory checkpointer for dev, tests and single-process REPL sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, Checkpointer,
    RunnableConfig,
};

/// Checkpointer that keeps every checkpoint in a map keyed by `(checkpoint_ns, thread_id)`.
///
/// Data is lost when the saver is dropped.
pub struct MemorySaver<S> {
    threads: RwLock<HashMap<(String, String), Vec<Checkpoint<S>>>>,
}

impl<S> MemorySaver<S> {
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
        }
    }

    fn key(config: &RunnableConfig) -> Result<(String, String), CheckpointError> {
        let thread_id = config
            .thread_id
            .clone()
            .ok_or(CheckpointError::ThreadIdRequired)?;
        Ok((config.checkpoint_ns.clone(), thread_id))
    }
}

impl<S> Default for MemorySaver<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let key = Self::key(config)?;
        let mut threads = self.threads.write().await;
        threads.entry(key).or_default().push(checkpoint.clone());
        Ok(checkpoint.id.clone())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let key = Self::key(config)?;
        let threads = self.threads.read().await;
        let Some(history) = threads.get(&key) else {
            return Ok(None);
        };
        let found = match &config.checkpoint_id {
            Some(id) => Some(
                history
                    .iter()
                    .rev()
                    .find(|cp| &cp.id == id)
                    .ok_or_else(|| CheckpointError::NotFound(id.clone()))?,
            ),
            None => history.last(),
        };
        Ok(found.map(|cp| (cp.clone(), cp.metadata.clone())))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let key = Self::key(config)?;
        let threads = self.threads.read().await;
        let items = threads
            .get(&key)
            .map(|history| {
                history
                    .iter()
                    .rev()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(|cp| CheckpointListItem {
                        checkpoint_id: cp.id.clone(),
                        metadata: cp.metadata.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }
}
