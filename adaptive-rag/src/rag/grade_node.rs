//! Document grading node.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;

use super::config::RagConfig;
use super::retrieval::grade_items;
use super::state::{PipelineState, PipelineUpdate};
use super::GRADE;

/// Grades every merged item with its own model call (one call per item, in
/// order) and writes `relevant_items` and `relevance_verdict`.
pub struct GradeNode {
    llm: Arc<dyn LlmClient>,
    config: Arc<RagConfig>,
}

impl GradeNode {
    pub fn new(llm: Arc<dyn LlmClient>, config: Arc<RagConfig>) -> Self {
        Self { llm, config }
    }
}

#[async_trait]
impl Node<PipelineState> for GradeNode {
    fn id(&self) -> &str {
        GRADE
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let (relevant, verdict) = grade_items(
            self.llm.as_ref(),
            &state.query,
            &state.merged_context,
            self.config.relevance_threshold,
        )
        .await?;
        Ok((
            PipelineUpdate {
                relevant_items: Some(relevant),
                relevance_verdict: Some(verdict),
                ..PipelineUpdate::step(GRADE)
            },
            Next::Continue,
        ))
    }
}
