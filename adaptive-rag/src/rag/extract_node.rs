//! Entity extraction node: start of the hybrid path.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;

use super::parse::parse_entities;
use super::prompts;
use super::state::{PipelineState, PipelineUpdate};
use super::EXTRACT_ENTITIES;

/// Asks the model for `{"entities": [...]}`; malformed output yields no entities.
pub struct ExtractEntitiesNode {
    llm: Arc<dyn LlmClient>,
}

impl ExtractEntitiesNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PipelineState> for ExtractEntitiesNode {
    fn id(&self) -> &str {
        EXTRACT_ENTITIES
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let reply = self
            .llm
            .invoke(&prompts::extract_entities(&state.query))
            .await?;
        let entities = parse_entities(&reply.content);
        tracing::debug!(
            entities = ?entities.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            "extracted entities"
        );
        Ok((
            PipelineUpdate {
                entities: Some(entities),
                ..PipelineUpdate::step(EXTRACT_ENTITIES)
            },
            Next::Continue,
        ))
    }
}
