//! Search, merge and grading helpers shared by the hybrid nodes and the fallback step.

use std::collections::HashSet;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::memory::{SearchHit, VectorStore};

use super::parse::{parse_score, parse_yes_no};
use super::prompts;
use super::state::{EntityMention, ItemSource, RelevanceVerdict, RetrievedItem};

fn to_item(hit: SearchHit, source: ItemSource) -> RetrievedItem {
    RetrievedItem {
        content: hit.text,
        metadata: hit.metadata,
        source,
    }
}

/// Items whose `tag_key` metadata case-insensitively contains an entity name.
///
/// Runs one vector search per entity (top `k`, query = entity name) and keeps
/// the hits tagged with that entity. No entities means no store calls.
pub async fn entity_search(
    store: &dyn VectorStore,
    entities: &[EntityMention],
    k: usize,
    tag_key: &str,
) -> Result<Vec<RetrievedItem>, AgentError> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for entity in entities {
        let needle = entity.name.to_lowercase();
        for hit in store.search(&entity.name, k).await? {
            let tagged = hit
                .metadata
                .get(tag_key)
                .is_some_and(|tags| tags.to_lowercase().contains(&needle));
            if tagged && seen.insert(hit.text.clone()) {
                items.push(to_item(hit, ItemSource::Entity));
            }
        }
    }
    tracing::debug!(entities = entities.len(), found = items.len(), "entity search");
    Ok(items)
}

/// Top-`k` similarity search for `query`.
pub async fn semantic_search(
    store: &dyn VectorStore,
    query: &str,
    k: usize,
) -> Result<Vec<RetrievedItem>, AgentError> {
    let items: Vec<_> = store
        .search(query, k)
        .await?
        .into_iter()
        .map(|hit| to_item(hit, ItemSource::Semantic))
        .collect();
    tracing::debug!(query, found = items.len(), "semantic search");
    Ok(items)
}

/// Entity items first (order kept), then semantic items whose content is not
/// already present, truncated to `cap`.
pub fn merge_results(
    entity_items: &[RetrievedItem],
    semantic_items: &[RetrievedItem],
    cap: usize,
) -> Vec<RetrievedItem> {
    let mut seen = HashSet::new();
    entity_items
        .iter()
        .chain(semantic_items)
        .filter(|item| seen.insert(item.content.as_str()))
        .take(cap)
        .cloned()
        .collect()
}

/// Concatenation with later duplicates (by content) removed.
pub fn dedup_by_content(items: Vec<RetrievedItem>) -> Vec<RetrievedItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.content.clone()))
        .collect()
}

/// Grades each item with one model call (in order) and returns the relevant
/// ones plus the verdict: `Relevant` iff at least `threshold` passed.
pub async fn grade_items(
    llm: &dyn LlmClient,
    query: &str,
    items: &[RetrievedItem],
    threshold: usize,
) -> Result<(Vec<RetrievedItem>, RelevanceVerdict), AgentError> {
    let mut relevant = Vec::new();
    for item in items {
        let reply = llm.invoke(&prompts::grade(query, &item.content)).await?;
        if parse_yes_no(&reply.content) {
            relevant.push(item.clone());
        }
    }
    let verdict = if relevant.len() >= threshold {
        RelevanceVerdict::Relevant
    } else {
        RelevanceVerdict::NotRelevant
    };
    tracing::debug!(graded = items.len(), relevant = relevant.len(), ?verdict, "graded documents");
    Ok((relevant, verdict))
}

/// Scores each item with one model call (in order), sorts by score with ties
/// keeping their order, and keeps the best `top_n`.
pub async fn rerank_items(
    llm: &dyn LlmClient,
    query: &str,
    items: &[RetrievedItem],
    top_n: usize,
) -> Result<Vec<RetrievedItem>, AgentError> {
    let mut scored = Vec::with_capacity(items.len());
    for item in items {
        let reply = llm.invoke(&prompts::rerank(query, &item.content)).await?;
        scored.push((parse_score(&reply.content), item));
    }
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    tracing::debug!(
        scores = ?scored.iter().map(|(score, _)| *score).collect::<Vec<_>>(),
        top_n,
        "reranked documents"
    );
    Ok(scored
        .into_iter()
        .take(top_n)
        .map(|(_, item)| item.clone())
        .collect())
}
