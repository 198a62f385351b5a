//! Fallback and finalize nodes: the bounded self-correction loop.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::memory::VectorStore;
use crate::message::Message;

use super::config::{QueryRewrite, RagConfig};
use super::parse::is_refusal;
use super::prompts;
use super::retrieval::{entity_search, grade_items, merge_results, rerank_items, semantic_search};
use super::state::{HallucinationVerdict, PipelineState, PipelineUpdate};
use super::{FALLBACK, FINALIZE};

/// Whether the state holds an answer that may be returned as is.
pub fn has_usable_answer(state: &PipelineState) -> bool {
    state.hallucination_verdict == Some(HallucinationVerdict::Grounded)
        && state.answer.as_deref().is_some_and(|a| !is_refusal(a))
}

/// One fallback iteration: bump the counter, rewrite the query, search both
/// ways again, merge (and rerank when enabled) and re-grade. Always continues
/// to generate.
pub struct FallbackNode {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn VectorStore>,
    config: Arc<RagConfig>,
}

impl FallbackNode {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn VectorStore>, config: Arc<RagConfig>) -> Self {
        Self { llm, store, config }
    }
}

impl FallbackNode {
    /// Search text for the next attempt. A blank hypothetical passage falls
    /// back to the suffixed query.
    async fn rewrite_query(&self, query: &str) -> Result<String, AgentError> {
        let suffixed = || format!("{}{}", query, self.config.fallback_suffix);
        match self.config.query_rewrite {
            QueryRewrite::Suffix => Ok(suffixed()),
            QueryRewrite::Hypothetical => {
                let reply = self.llm.invoke(&prompts::hypothetical_document(query)).await?;
                let passage = reply.content.trim();
                if passage.is_empty() {
                    tracing::warn!("empty hypothetical document, using suffixed query");
                    Ok(suffixed())
                } else {
                    Ok(passage.to_string())
                }
            }
        }
    }
}

#[async_trait]
impl Node<PipelineState> for FallbackNode {
    fn id(&self) -> &str {
        FALLBACK
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let retry_counter = state.retry_counter + 1;
        let search_query = self.rewrite_query(&state.query).await?;
        tracing::info!(retry = retry_counter, %search_query, "fallback re-search");

        let (entity_items, semantic_items) = futures::try_join!(
            entity_search(
                self.store.as_ref(),
                &state.entities,
                self.config.entity_k,
                &self.config.entity_metadata_key,
            ),
            semantic_search(self.store.as_ref(), &search_query, self.config.semantic_k),
        )?;
        let mut merged = merge_results(&entity_items, &semantic_items, self.config.merge_cap);
        if let Some(top_n) = self.config.rerank_top_n {
            merged = rerank_items(self.llm.as_ref(), &state.query, &merged, top_n).await?;
        }
        let (relevant, verdict) = grade_items(
            self.llm.as_ref(),
            &state.query,
            &merged,
            self.config.relevance_threshold,
        )
        .await?;

        Ok((
            PipelineUpdate {
                retry_counter: Some(retry_counter),
                search_query: Some(search_query),
                entity_items: Some(entity_items),
                semantic_items: Some(semantic_items),
                merged_context: Some(merged),
                relevant_items: Some(relevant),
                relevance_verdict: Some(verdict),
                ..PipelineUpdate::step(FALLBACK)
            },
            Next::Continue,
        ))
    }
}

/// Terminal step of the hybrid path: keeps a grounded answer, otherwise
/// replaces it with the canned not-found message. Records the turn in history.
pub struct FinalizeNode;

#[async_trait]
impl Node<PipelineState> for FinalizeNode {
    fn id(&self) -> &str {
        FINALIZE
    }

    async fn run(&self, state: &PipelineState) -> Result<(PipelineUpdate, Next), AgentError> {
        let answer = match &state.answer {
            Some(answer) if has_usable_answer(state) => answer.clone(),
            _ => {
                tracing::info!(retries = state.retry_counter, "no usable answer found");
                prompts::not_found(&state.query)
            }
        };
        Ok((
            PipelineUpdate {
                history: vec![
                    Message::user(state.query.clone()),
                    Message::assistant(answer.clone()),
                ],
                answer: Some(answer),
                ..PipelineUpdate::step(FINALIZE)
            },
            Next::Continue,
        ))
    }
}
