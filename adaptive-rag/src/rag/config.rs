//! Tunables for the adaptive pipeline.

use std::time::Duration;

/// Suffix appended to the query on each fallback re-search.
pub const FALLBACK_SUFFIX: &str = " (detailed explanation)";

/// Metadata key holding the comma-joined entity tags of a document.
pub const ENTITY_METADATA_KEY: &str = "entities";

/// Supersteps of the longest non-looping path (hybrid with rerank), plus headroom.
const BASE_SUPERSTEPS: usize = 16;
/// fallback, generate, check.
const SUPERSTEPS_PER_RETRY: usize = 3;

/// How the fallback step rewrites the search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryRewrite {
    /// Append `fallback_suffix` to the original query.
    #[default]
    Suffix,
    /// Ask the model for a hypothetical answer passage and search with it (HyDE).
    Hypothetical,
}

/// Pipeline configuration.
///
/// Defaults follow the tutorial corpus: three semantic hits, two hits per
/// entity, a merged context of five, two relevant items to pass grading and
/// two fallback retries.
#[derive(Debug, Clone, PartialEq)]
pub struct RagConfig {
    /// Top-k for the semantic search branch.
    pub semantic_k: usize,
    /// Top-k for each per-entity vector search before tag filtering.
    pub entity_k: usize,
    /// Top-k per sub-question on the complex path.
    pub sub_query_k: usize,
    /// Maximum merged context length.
    pub merge_cap: usize,
    /// Relevant items needed for `RelevanceVerdict::Relevant`.
    pub relevance_threshold: usize,
    /// Fallback iterations before the loop terminates.
    pub max_retries: u32,
    /// Sub-questions kept from the decomposition.
    pub max_sub_queries: usize,
    pub fallback_suffix: String,
    pub query_rewrite: QueryRewrite,
    /// When set, merged results are scored by the model (0-10 each) and cut to
    /// this many before grading.
    pub rerank_top_n: Option<usize>,
    pub entity_metadata_key: String,
    /// Prior messages carried into the direct-answer prompt.
    pub history_limit: usize,
    /// Per-call timeout for LLM and vector store calls; `None` disables it.
    pub call_timeout: Option<Duration>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            semantic_k: 3,
            entity_k: 2,
            sub_query_k: 2,
            merge_cap: 5,
            relevance_threshold: 2,
            max_retries: 2,
            max_sub_queries: 3,
            fallback_suffix: FALLBACK_SUFFIX.to_string(),
            query_rewrite: QueryRewrite::Suffix,
            rerank_top_n: None,
            entity_metadata_key: ENTITY_METADATA_KEY.to_string(),
            history_limit: 10,
            call_timeout: None,
        }
    }
}

impl RagConfig {
    /// Superstep budget for one run. Grows with `max_retries` so the retry
    /// loop always ends at `finalize` rather than at the runtime's guard.
    pub fn recursion_limit(&self) -> usize {
        BASE_SUPERSTEPS.saturating_add(
            (self.max_retries as usize).saturating_mul(SUPERSTEPS_PER_RETRY),
        )
    }
}
