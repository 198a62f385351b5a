//! Direct answer node: simple queries, no retrieval.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;

use super::prompts;
use super::state::{PipelineState, PipelineUpdate};
use super::DIRECT;

/// Answers from the model alone, with the session's earlier turns as context.
pub struct DirectAnswerNode {
    llm: Arc<dyn LlmClient>,
}

impl DirectAnswerNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PipelineState> for DirectAnswerNode {
    fn id(&self) -> &str {
        DIRECT
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let reply = self
            .llm
            .invoke(&prompts::direct(&state.query, &state.history))
            .await?;
        Ok((
            PipelineUpdate {
                history: vec![
                    Message::user(state.query.clone()),
                    Message::assistant(reply.content.clone()),
                ],
                answer: Some(reply.content),
                ..PipelineUpdate::step(DIRECT)
            },
            Next::Continue,
        ))
    }
}
