//! Moderate queries: parallel entity and semantic search, merge, grading,
//! generation and the grounding check.

use std::collections::HashSet;
use std::sync::Arc;

use adaptive_rag::rag::{
    merge_results, HallucinationVerdict, ItemSource, RelevanceVerdict, CHECK, CLASSIFY, ENTITY_SEARCH,
    EXTRACT_ENTITIES, FINALIZE, GENERATE, GRADE, MERGE, RERANK, SEMANTIC_SEARCH,
};
use adaptive_rag::{MockLlm, RagConfig, Strategy};

use crate::common::{corpus_store, runner, runner_with, steps};

const ANSWER: &str = "LangGraph is a stateful agent framework; ChromaDB is a vector database \
used with LangChain.";

fn scripted_llm() -> Arc<MockLlm> {
    Arc::new(
        MockLlm::new("no")
            .when("Classify the complexity", "moderate")
            .when(
                "Extract the named entities",
                r#"{"entities": [{"name": "LangGraph", "type": "technology"}, {"name": "ChromaDB", "type": "technology"}]}"#,
            )
            .when("Grade this document: LangGraph", "yes")
            .when("Grade this document: ChromaDB", "yes")
            .when("Answer the question using only the context", ANSWER)
            .when("Check whether the answer is grounded", "grounded"),
    )
}

/// **Scenario**: Two known technologies: both searches find items, grading passes,
/// the grounded answer is returned on the first iteration.
#[tokio::test]
async fn known_entities_answer_first_time() {
    let llm = scripted_llm();
    let store = corpus_store().await;

    let outcome = runner(llm.clone(), store)
        .invoke("How do LangGraph and ChromaDB work together?", None)
        .await
        .unwrap();
    let state = &outcome.state;

    assert_eq!(outcome.strategy, Strategy::Hybrid);
    assert_eq!(outcome.answer, ANSWER);
    assert_eq!(outcome.retry_count, 0);
    assert_eq!(
        outcome.steps,
        steps(&[
            CLASSIFY,
            EXTRACT_ENTITIES,
            ENTITY_SEARCH,
            SEMANTIC_SEARCH,
            MERGE,
            GRADE,
            GENERATE,
            CHECK,
            FINALIZE,
        ])
    );

    assert!(!state.entity_items.is_empty());
    assert!(state.entity_items.iter().all(|i| i.source == ItemSource::Entity));
    assert!(!state.semantic_items.is_empty());

    let merged: Vec<_> = state.merged_context.iter().map(|i| i.content.as_str()).collect();
    let unique: HashSet<_> = merged.iter().collect();
    assert_eq!(unique.len(), merged.len(), "merge must not repeat content");
    assert_eq!(
        state.merged_context,
        merge_results(&state.entity_items, &state.semantic_items, 5)
    );
    assert_eq!(state.merged_context[0].source, ItemSource::Entity);

    assert_eq!(state.relevance_verdict, Some(RelevanceVerdict::Relevant));
    assert!(state.relevant_items.len() >= 2);
    assert_eq!(state.hallucination_verdict, Some(HallucinationVerdict::Grounded));
    assert_eq!(llm.calls_containing("Answer the question using only the context"), 1);
}

/// **Scenario**: With zero entities both search branches still run exactly once before merge.
#[tokio::test]
async fn zero_entities_still_runs_both_branches() {
    let llm = Arc::new(
        MockLlm::new("no")
            .when("Classify the complexity", "moderate")
            .when("Extract the named entities", "{\"entities\": []}"),
    );
    let store = corpus_store().await;

    let outcome = runner(llm, store.clone())
        .invoke("what grades retrieval quality", None)
        .await
        .unwrap();

    let before_merge: Vec<_> = outcome
        .steps
        .iter()
        .take_while(|s| s.as_str() != MERGE)
        .collect();
    assert_eq!(before_merge.iter().filter(|s| s.as_str() == ENTITY_SEARCH).count(), 1);
    assert_eq!(before_merge.iter().filter(|s| s.as_str() == SEMANTIC_SEARCH).count(), 1);
    assert!(outcome.state.entity_items.is_empty());
    assert_eq!(store.queries()[0], "what grades retrieval quality");
}

/// **Scenario**: With rerank enabled the merged context is re-scored and cut before grading.
#[tokio::test]
async fn rerank_reorders_and_trims_before_grading() {
    let llm = Arc::new(
        MockLlm::new("no")
            .when("Classify the complexity", "moderate")
            .when(
                "Extract the named entities",
                r#"{"entities": [{"name": "LangGraph", "type": "technology"}]}"#,
            )
            .when("Score this document: LangGraph", "9")
            .when("Score this document:", "3")
            .when("Grade whether the document is relevant", "yes")
            .when("Answer the question using only the context", "LangGraph is an agent framework.")
            .when("Check whether the answer is grounded", "grounded"),
    );
    let store = corpus_store().await;
    let config = RagConfig {
        rerank_top_n: Some(3),
        ..RagConfig::default()
    };

    let outcome = runner_with(llm.clone(), store, config)
        .invoke("What is LangGraph?", None)
        .await
        .unwrap();
    let state = &outcome.state;

    assert_eq!(
        outcome.steps,
        steps(&[
            CLASSIFY,
            EXTRACT_ENTITIES,
            ENTITY_SEARCH,
            SEMANTIC_SEARCH,
            MERGE,
            RERANK,
            GRADE,
            GENERATE,
            CHECK,
            FINALIZE,
        ])
    );
    assert_eq!(state.merged_context.len(), 3);
    assert!(state.merged_context[0].content.starts_with("LangGraph"));
    let merged_before = merge_results(&state.entity_items, &state.semantic_items, 5);
    assert_eq!(llm.calls_containing("Rate how relevant"), merged_before.len());
    assert_eq!(
        llm.calls_containing("Grade whether the document is relevant"),
        state.merged_context.len()
    );
    assert_eq!(outcome.answer, "LangGraph is an agent framework.");
}
