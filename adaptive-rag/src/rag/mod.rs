//! Adaptive, self-correcting retrieval pipeline.
//!
//! A classifier picks one of three strategies per query:
//!
//! - **simple**: answer directly, no retrieval.
//! - **moderate**: entity search and semantic search in parallel, merge, grade,
//!   optionally rerank, generate, check grounding; re-search with a rewritten
//!   query (bounded by [`RagConfig::max_retries`]) when grading or the
//!   grounding check fails.
//! - **complex**: split into sub-questions, search each, synthesize.
//!
//! [`build_graph`] wires the steps into a [`StateGraph`](crate::graph::StateGraph);
//! [`AdaptiveRagRunner`] compiles it and runs queries, optionally per session.

mod check_node;
mod classify_node;
mod complex_nodes;
mod config;
mod direct_node;
mod extract_node;
mod fallback_node;
mod generate_node;
mod grade_node;
mod graph;
mod parse;
pub mod prompts;
mod rerank_node;
mod retrieval;
mod runner;
mod search_nodes;
mod state;

/// Node ids, as recorded in `PipelineState::steps`.
pub const CLASSIFY: &str = "classify";
pub const DIRECT: &str = "direct_answer";
pub const EXTRACT_ENTITIES: &str = "extract_entities";
pub const ENTITY_SEARCH: &str = "entity_search";
pub const SEMANTIC_SEARCH: &str = "semantic_search";
pub const MERGE: &str = "merge";
pub const RERANK: &str = "rerank";
pub const GRADE: &str = "grade_documents";
pub const GENERATE: &str = "generate";
pub const CHECK: &str = "check_hallucination";
pub const FALLBACK: &str = "fallback";
pub const FINALIZE: &str = "finalize";
pub const DECOMPOSE: &str = "decompose";
pub const MULTI_SEARCH: &str = "multi_search";
pub const SYNTHESIZE: &str = "synthesize";

pub use check_node::HallucinationCheckNode;
pub use classify_node::{strategy_for, ClassifyNode};
pub use complex_nodes::{DecomposeNode, MultiSearchNode, SynthesizeNode};
pub use config::{QueryRewrite, RagConfig, ENTITY_METADATA_KEY, FALLBACK_SUFFIX};
pub use direct_node::DirectAnswerNode;
pub use extract_node::ExtractEntitiesNode;
pub use fallback_node::{has_usable_answer, FallbackNode, FinalizeNode};
pub use generate_node::{refusal_answer, GenerateNode};
pub use grade_node::GradeNode;
pub use graph::{build_graph, route_after_check, route_after_grade, route_by_complexity};
pub use parse::{
    is_refusal, parse_complexity, parse_entities, parse_hallucination, parse_score,
    parse_sub_queries, parse_yes_no, DEFAULT_COMPLEXITY, DEFAULT_RERANK_SCORE, REFUSAL_PHRASE,
};
pub use rerank_node::RerankNode;
pub use retrieval::{
    dedup_by_content, entity_search, grade_items, merge_results, rerank_items, semantic_search,
};
pub use runner::{build_initial_state, AdaptiveRagRunner, RagOutcome, RunError};
pub use search_nodes::{EntitySearchNode, MergeNode, SemanticSearchNode};
pub use state::{
    join_contents, Complexity, EntityKind, EntityMention, HallucinationVerdict, ItemSource,
    PipelineState, PipelineUpdate, RelevanceVerdict, RetrievedItem, Strategy,
};
