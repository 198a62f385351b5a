//! Classify node: one model call deciding simple / moderate / complex.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;

use super::parse::parse_complexity;
use super::prompts;
use super::state::{Complexity, PipelineState, PipelineUpdate, Strategy};
use super::CLASSIFY;

/// Writes `complexity` and the matching `strategy`. Routing happens on the
/// conditional edge out of this node.
pub struct ClassifyNode {
    llm: Arc<dyn LlmClient>,
}

impl ClassifyNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

/// Strategy the dispatcher runs for a complexity label.
pub fn strategy_for(complexity: Complexity) -> Strategy {
    match complexity {
        Complexity::Simple => Strategy::Direct,
        Complexity::Moderate => Strategy::Hybrid,
        Complexity::Complex => Strategy::Decomposition,
    }
}

#[async_trait]
impl Node<PipelineState> for ClassifyNode {
    fn id(&self) -> &str {
        CLASSIFY
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let reply = self.llm.invoke(&prompts::classify(&state.query)).await?;
        let complexity = parse_complexity(&reply.content);
        let strategy = strategy_for(complexity);
        tracing::info!(%complexity, %strategy, "query classified");
        Ok((
            PipelineUpdate {
                complexity: Some(complexity),
                strategy: Some(strategy),
                ..PipelineUpdate::step(CLASSIFY)
            },
            Next::Continue,
        ))
    }
}
