//! Generation node: answer from the relevant context only.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;

use super::parse::REFUSAL_PHRASE;
use super::prompts;
use super::state::{PipelineState, PipelineUpdate};
use super::GENERATE;

/// Answer returned without a model call when there is no relevant context.
pub fn refusal_answer() -> String {
    format!("I {}.", REFUSAL_PHRASE)
}

pub struct GenerateNode {
    llm: Arc<dyn LlmClient>,
}

impl GenerateNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PipelineState> for GenerateNode {
    fn id(&self) -> &str {
        GENERATE
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let answer = if state.relevant_items.is_empty() {
            tracing::debug!("no relevant context, refusing without a model call");
            refusal_answer()
        } else {
            self.llm
                .invoke(&prompts::generate(&state.query, &state.relevant_context()))
                .await?
                .content
        };
        Ok((
            PipelineUpdate {
                answer: Some(answer),
                ..PipelineUpdate::step(GENERATE)
            },
            Next::Continue,
        ))
    }
}
