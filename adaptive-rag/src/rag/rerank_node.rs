//! Optional rerank step between merge and grading.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;

use super::retrieval::rerank_items;
use super::state::{PipelineState, PipelineUpdate};
use super::RERANK;

/// Re-scores `merged_context` with one model call per item and keeps the
/// best `top_n`, so grading sees fewer, better-ordered documents.
pub struct RerankNode {
    llm: Arc<dyn LlmClient>,
    top_n: usize,
}

impl RerankNode {
    pub fn new(llm: Arc<dyn LlmClient>, top_n: usize) -> Self {
        Self { llm, top_n }
    }
}

#[async_trait]
impl Node<PipelineState> for RerankNode {
    fn id(&self) -> &str {
        RERANK
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let ranked = rerank_items(
            self.llm.as_ref(),
            &state.query,
            &state.merged_context,
            self.top_n,
        )
        .await?;
        Ok((
            PipelineUpdate {
                merged_context: Some(ranked),
                ..PipelineUpdate::step(RERANK)
            },
            Next::Continue,
        ))
    }
}
