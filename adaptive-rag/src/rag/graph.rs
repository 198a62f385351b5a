//! Wires the pipeline nodes into a state graph.
//!
//! ```text
//! classify ─┬─ simple ───▶ direct_answer ─────────────────────────────────────▶ END
//!           ├─ moderate ─▶ extract_entities ─┬▶ entity_search ──┐
//!           │                                └▶ semantic_search ┴(join)▶ merge ─▶ grade_documents
//!           │     grade_documents ─┬ relevant ─────────▶ generate ─▶ check_hallucination
//!           │                      ├ retry < max ──────▶ fallback ─▶ generate
//!           │                      └ exhausted ────────▶ finalize ─▶ END
//!           │     check_hallucination ─┬ usable answer ─▶ finalize
//!           │                          ├ retry < max ───▶ fallback
//!           │                          └ exhausted ─────▶ finalize
//!           └─ complex ──▶ decompose ─▶ multi_search ─▶ synthesize ───────────▶ END
//! ```
//!
//! With `RagConfig::rerank_top_n` set, `merge ─▶ rerank ─▶ grade_documents`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::{StateGraph, END, START};
use crate::llm::LlmClient;
use crate::memory::VectorStore;

use super::check_node::HallucinationCheckNode;
use super::classify_node::ClassifyNode;
use super::complex_nodes::{DecomposeNode, MultiSearchNode, SynthesizeNode};
use super::config::RagConfig;
use super::direct_node::DirectAnswerNode;
use super::extract_node::ExtractEntitiesNode;
use super::fallback_node::{has_usable_answer, FallbackNode, FinalizeNode};
use super::generate_node::GenerateNode;
use super::grade_node::GradeNode;
use super::rerank_node::RerankNode;
use super::search_nodes::{EntitySearchNode, MergeNode, SemanticSearchNode};
use super::state::{Complexity, PipelineState, RelevanceVerdict};
use super::{
    CHECK, CLASSIFY, DECOMPOSE, DIRECT, ENTITY_SEARCH, EXTRACT_ENTITIES, FALLBACK, FINALIZE,
    GENERATE, GRADE, MERGE, MULTI_SEARCH, RERANK, SEMANTIC_SEARCH, SYNTHESIZE,
};

fn path_map(targets: &[&str]) -> HashMap<String, String> {
    targets
        .iter()
        .map(|t| (t.to_string(), t.to_string()))
        .collect()
}

/// classify → direct_answer | extract_entities | decompose.
pub fn route_by_complexity(state: &PipelineState) -> String {
    match state.complexity {
        Some(Complexity::Simple) => DIRECT,
        Some(Complexity::Complex) => DECOMPOSE,
        Some(Complexity::Moderate) | None => EXTRACT_ENTITIES,
    }
    .to_string()
}

/// grade_documents → generate | fallback | finalize.
pub fn route_after_grade(state: &PipelineState, max_retries: u32) -> String {
    if state.relevance_verdict == Some(RelevanceVerdict::Relevant) {
        GENERATE
    } else if state.retry_counter < max_retries {
        FALLBACK
    } else {
        FINALIZE
    }
    .to_string()
}

/// check_hallucination → finalize | fallback.
pub fn route_after_check(state: &PipelineState, max_retries: u32) -> String {
    if has_usable_answer(state) || state.retry_counter >= max_retries {
        FINALIZE
    } else {
        FALLBACK
    }
    .to_string()
}

/// Builds the uncompiled pipeline graph, with a superstep limit sized for
/// `config.max_retries`.
pub fn build_graph(
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn VectorStore>,
    config: Arc<RagConfig>,
) -> StateGraph<PipelineState> {
    let max_retries = config.max_retries;
    let mut graph = StateGraph::<PipelineState>::new();
    graph.with_recursion_limit(config.recursion_limit());
    match config.rerank_top_n {
        Some(top_n) => {
            graph
                .add_node(RERANK, Arc::new(RerankNode::new(llm.clone(), top_n)))
                .add_edge(MERGE, RERANK)
                .add_edge(RERANK, GRADE);
        }
        None => {
            graph.add_edge(MERGE, GRADE);
        }
    }
    graph
        .add_node(CLASSIFY, Arc::new(ClassifyNode::new(llm.clone())))
        .add_node(DIRECT, Arc::new(DirectAnswerNode::new(llm.clone())))
        .add_node(EXTRACT_ENTITIES, Arc::new(ExtractEntitiesNode::new(llm.clone())))
        .add_node(
            ENTITY_SEARCH,
            Arc::new(EntitySearchNode::new(store.clone(), config.clone())),
        )
        .add_node(
            SEMANTIC_SEARCH,
            Arc::new(SemanticSearchNode::new(store.clone(), config.clone())),
        )
        .add_node(MERGE, Arc::new(MergeNode::new(config.merge_cap)))
        .add_node(GRADE, Arc::new(GradeNode::new(llm.clone(), config.clone())))
        .add_node(GENERATE, Arc::new(GenerateNode::new(llm.clone())))
        .add_node(CHECK, Arc::new(HallucinationCheckNode::new(llm.clone())))
        .add_node(
            FALLBACK,
            Arc::new(FallbackNode::new(llm.clone(), store.clone(), config.clone())),
        )
        .add_node(FINALIZE, Arc::new(FinalizeNode))
        .add_node(DECOMPOSE, Arc::new(DecomposeNode::new(llm.clone(), config.clone())))
        .add_node(MULTI_SEARCH, Arc::new(MultiSearchNode::new(store, config)))
        .add_node(SYNTHESIZE, Arc::new(SynthesizeNode::new(llm)))
        .add_edge(START, CLASSIFY)
        .add_edge(DIRECT, END)
        .add_edge(EXTRACT_ENTITIES, ENTITY_SEARCH)
        .add_edge(EXTRACT_ENTITIES, SEMANTIC_SEARCH)
        .add_edge(GENERATE, CHECK)
        .add_edge(FALLBACK, GENERATE)
        .add_edge(FINALIZE, END)
        .add_edge(DECOMPOSE, MULTI_SEARCH)
        .add_edge(MULTI_SEARCH, SYNTHESIZE)
        .add_edge(SYNTHESIZE, END)
        .add_join([ENTITY_SEARCH, SEMANTIC_SEARCH], MERGE)
        .add_conditional_edges(
            CLASSIFY,
            route_by_complexity,
            path_map(&[DIRECT, EXTRACT_ENTITIES, DECOMPOSE]),
        )
        .add_conditional_edges(
            GRADE,
            move |s: &PipelineState| route_after_grade(s, max_retries),
            path_map(&[GENERATE, FALLBACK, FINALIZE]),
        )
        .add_conditional_edges(
            CHECK,
            move |s: &PipelineState| route_after_check(s, max_retries),
            path_map(&[FINALIZE, FALLBACK]),
        );
    graph
}
