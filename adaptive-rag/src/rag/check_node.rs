//! Hallucination check node.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;

use super::parse::{is_refusal, parse_hallucination};
use super::prompts;
use super::state::{HallucinationVerdict, PipelineState, PipelineUpdate};
use super::CHECK;

/// Judges whether the answer is grounded in the relevant context.
///
/// A refusal claims nothing and is recorded `Grounded` without a model call;
/// the router still treats it as unusable.
pub struct HallucinationCheckNode {
    llm: Arc<dyn LlmClient>,
}

impl HallucinationCheckNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PipelineState> for HallucinationCheckNode {
    fn id(&self) -> &str {
        CHECK
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let answer = state.answer.as_deref().unwrap_or_default();
        let verdict = if is_refusal(answer) {
            HallucinationVerdict::Grounded
        } else {
            let reply = self
                .llm
                .invoke(&prompts::check_hallucination(
                    &state.relevant_context(),
                    answer,
                ))
                .await?;
            parse_hallucination(&reply.content)
        };
        tracing::debug!(?verdict, retry = state.retry_counter, "hallucination check");
        Ok((
            PipelineUpdate {
                hallucination_verdict: Some(verdict),
                ..PipelineUpdate::step(CHECK)
            },
            Next::Continue,
        ))
    }
}
