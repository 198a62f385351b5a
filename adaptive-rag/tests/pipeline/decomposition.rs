//! Complex queries: decomposition, one search per sub-question plus the
//! original, one synthesis call.

use std::sync::Arc;

use adaptive_rag::rag::{CLASSIFY, DECOMPOSE, MULTI_SEARCH, SYNTHESIZE};
use adaptive_rag::{MockLlm, Strategy};

use crate::common::{corpus_store, runner, steps};

const QUERY: &str = "Compare Self-RAG and Corrective RAG";

/// **Scenario**: Sub-queries are searched in order, then the original; one synthesis call
/// sees every retrieved item.
#[tokio::test]
async fn complex_query_is_decomposed_and_synthesized() {
    let llm = Arc::new(
        MockLlm::new("unused")
            .when("Classify the complexity", "complex")
            .when(
                "Break the question into",
                "1. What is Self-RAG?\n2. What is Corrective RAG?",
            )
            .when(
                "Combine the retrieved information",
                "Self-RAG decides when to retrieve; Corrective RAG re-searches after grading.",
            ),
    );
    let store = corpus_store().await;

    let outcome = runner(llm.clone(), store.clone()).invoke(QUERY, None).await.unwrap();

    assert_eq!(outcome.strategy, Strategy::Decomposition);
    assert_eq!(outcome.steps, steps(&[CLASSIFY, DECOMPOSE, MULTI_SEARCH, SYNTHESIZE]));
    assert_eq!(
        outcome.state.sub_queries,
        vec!["What is Self-RAG?".to_string(), "What is Corrective RAG?".to_string()]
    );
    assert_eq!(
        store.queries(),
        vec![
            "What is Self-RAG?".to_string(),
            "What is Corrective RAG?".to_string(),
            QUERY.to_string(),
        ]
    );

    assert_eq!(llm.calls_containing("Combine the retrieved information"), 1);
    let synthesis = llm
        .calls()
        .into_iter()
        .find(|m| m.iter().any(|m| m.content().contains("Combine the retrieved information")))
        .unwrap();
    let prompt: String = synthesis.iter().map(|m| m.content()).collect();
    assert!(!outcome.state.retrieved_items.is_empty());
    for item in &outcome.state.retrieved_items {
        assert!(prompt.contains(&item.content), "missing {}", item.content);
    }
    assert!(outcome.answer.starts_with("Self-RAG decides"));
}

/// **Scenario**: An empty decomposition falls back to searching the original query.
#[tokio::test]
async fn empty_decomposition_uses_original_query() {
    let llm = Arc::new(
        MockLlm::new("")
            .when("Classify the complexity", "complex")
            .when("Combine the retrieved information", "done"),
    );
    let store = corpus_store().await;

    let outcome = runner(llm, store.clone()).invoke(QUERY, None).await.unwrap();

    assert_eq!(outcome.state.sub_queries, vec![QUERY.to_string()]);
    assert_eq!(store.queries(), vec![QUERY.to_string(), QUERY.to_string()]);
    assert_eq!(outcome.answer, "done");
}
