//! The two parallel retrieval branches of the hybrid path and their merge.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::memory::VectorStore;

use super::config::RagConfig;
use super::retrieval::{entity_search, merge_results, semantic_search};
use super::state::{PipelineState, PipelineUpdate};
use super::{ENTITY_SEARCH, MERGE, SEMANTIC_SEARCH};

/// Searches by extracted entity names; writes `entity_items` only.
pub struct EntitySearchNode {
    store: Arc<dyn VectorStore>,
    config: Arc<RagConfig>,
}

impl EntitySearchNode {
    pub fn new(store: Arc<dyn VectorStore>, config: Arc<RagConfig>) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl Node<PipelineState> for EntitySearchNode {
    fn id(&self) -> &str {
        ENTITY_SEARCH
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let items = entity_search(
            self.store.as_ref(),
            &state.entities,
            self.config.entity_k,
            &self.config.entity_metadata_key,
        )
        .await?;
        Ok((
            PipelineUpdate {
                entity_items: Some(items),
                ..PipelineUpdate::step(ENTITY_SEARCH)
            },
            Next::Continue,
        ))
    }
}

/// Similarity search for the current query; writes `semantic_items` only.
///
/// Runs whether or not any entities were extracted.
pub struct SemanticSearchNode {
    store: Arc<dyn VectorStore>,
    config: Arc<RagConfig>,
}

impl SemanticSearchNode {
    pub fn new(store: Arc<dyn VectorStore>, config: Arc<RagConfig>) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl Node<PipelineState> for SemanticSearchNode {
    fn id(&self) -> &str {
        SEMANTIC_SEARCH
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let items = semantic_search(
            self.store.as_ref(),
            &state.search_query,
            self.config.semantic_k,
        )
        .await?;
        Ok((
            PipelineUpdate {
                semantic_items: Some(items),
                ..PipelineUpdate::step(SEMANTIC_SEARCH)
            },
            Next::Continue,
        ))
    }
}

/// Join point of the two branches: pure merge into `merged_context`.
pub struct MergeNode {
    cap: usize,
}

impl MergeNode {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }
}

#[async_trait]
impl Node<PipelineState> for MergeNode {
    fn id(&self) -> &str {
        MERGE
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let merged = merge_results(&state.entity_items, &state.semantic_items, self.cap);
        tracing::debug!(
            entity = state.entity_items.len(),
            semantic = state.semantic_items.len(),
            merged = merged.len(),
            "merged results"
        );
        Ok((
            PipelineUpdate {
                merged_context: Some(merged),
                ..PipelineUpdate::step(MERGE)
            },
            Next::Continue,
        ))
    }
}
