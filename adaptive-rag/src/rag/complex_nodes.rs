//! Complex path: decompose into sub-questions, search each, synthesize.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::memory::VectorStore;
use crate::message::Message;

use super::config::RagConfig;
use super::parse::parse_sub_queries;
use super::prompts;
use super::retrieval::{dedup_by_content, semantic_search};
use super::state::{join_contents, PipelineState, PipelineUpdate};
use super::{DECOMPOSE, MULTI_SEARCH, SYNTHESIZE};

/// One model call producing at most `max_sub_queries` sub-questions.
pub struct DecomposeNode {
    llm: Arc<dyn LlmClient>,
    config: Arc<RagConfig>,
}

impl DecomposeNode {
    pub fn new(llm: Arc<dyn LlmClient>, config: Arc<RagConfig>) -> Self {
        Self { llm, config }
    }
}

#[async_trait]
impl Node<PipelineState> for DecomposeNode {
    fn id(&self) -> &str {
        DECOMPOSE
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let reply = self.llm.invoke(&prompts::decompose(&state.query)).await?;
        let sub_queries =
            parse_sub_queries(&reply.content, &state.query, self.config.max_sub_queries);
        tracing::debug!(?sub_queries, "decomposed query");
        Ok((
            PipelineUpdate {
                sub_queries: Some(sub_queries),
                ..PipelineUpdate::step(DECOMPOSE)
            },
            Next::Continue,
        ))
    }
}

/// Semantic search for every sub-question and then the original query, in
/// order; the concatenation is deduplicated by content.
pub struct MultiSearchNode {
    store: Arc<dyn VectorStore>,
    config: Arc<RagConfig>,
}

impl MultiSearchNode {
    pub fn new(store: Arc<dyn VectorStore>, config: Arc<RagConfig>) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl Node<PipelineState> for MultiSearchNode {
    fn id(&self) -> &str {
        MULTI_SEARCH
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let mut all = Vec::new();
        for query in state.sub_queries.iter().chain(std::iter::once(&state.query)) {
            all.extend(semantic_search(self.store.as_ref(), query, self.config.sub_query_k).await?);
        }
        let items = dedup_by_content(all);
        Ok((
            PipelineUpdate {
                retrieved_items: Some(items),
                ..PipelineUpdate::step(MULTI_SEARCH)
            },
            Next::Continue,
        ))
    }
}

/// One model call answering from everything the sub-question searches found.
pub struct SynthesizeNode {
    llm: Arc<dyn LlmClient>,
}

impl SynthesizeNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PipelineState> for SynthesizeNode {
    fn id(&self) -> &str {
        SYNTHESIZE
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let context = join_contents(&state.retrieved_items);
        let reply = self
            .llm
            .invoke(&prompts::synthesize(&state.query, &state.sub_queries, &context))
            .await?;
        Ok((
            PipelineUpdate {
                history: vec![
                    Message::user(state.query.clone()),
                    Message::assistant(reply.content.clone()),
                ],
                answer: Some(reply.content),
                ..PipelineUpdate::step(SYNTHESIZE)
            },
            Next::Continue,
        ))
    }
}
