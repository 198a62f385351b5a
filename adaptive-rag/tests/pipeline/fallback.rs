//! The self-correcting loop: fallback re-search and its retry bound.

use std::sync::Arc;

use adaptive_rag::rag::{
    prompts, HallucinationVerdict, RelevanceVerdict, CHECK, CLASSIFY, ENTITY_SEARCH,
    EXTRACT_ENTITIES, FALLBACK, FALLBACK_SUFFIX, FINALIZE, GENERATE, GRADE, MERGE,
    SEMANTIC_SEARCH,
};
use adaptive_rag::stream::StreamEvent;
use adaptive_rag::{MockLlm, PipelineState, QueryRewrite, RagConfig};

use crate::common::{corpus_store, runner, runner_with, steps};

const OFF_TOPIC: &str = "What is the best pasta recipe?";

fn nothing_relevant_llm() -> Arc<MockLlm> {
    Arc::new(
        MockLlm::new("no")
            .when("Classify the complexity", "moderate")
            .when("Extract the named entities", "{\"entities\": []}"),
    )
}

/// Grades everything relevant but never accepts an answer as grounded.
fn never_grounded_llm() -> Arc<MockLlm> {
    Arc::new(
        MockLlm::new("unused")
            .when("Classify the complexity", "moderate")
            .when(
                "Extract the named entities",
                r#"{"entities": [{"name": "LangGraph", "type": "technology"}]}"#,
            )
            .when("Grade whether the document is relevant", "yes")
            .when("Answer the question using only the context", "LangGraph was invented in 1850.")
            .when("Check whether the answer is grounded", "hallucinated"),
    )
}

/// **Scenario**: An off-topic query exhausts the retries and gets the canned answer.
#[tokio::test]
async fn unrelated_query_ends_with_canned_answer() {
    let llm = nothing_relevant_llm();
    let store = corpus_store().await;

    let outcome = runner(llm, store.clone()).invoke(OFF_TOPIC, None).await.unwrap();

    assert_eq!(outcome.answer, prompts::not_found(OFF_TOPIC));
    assert_eq!(
        outcome.answer,
        "Sorry, I could not find information for 'What is the best pasta recipe?'."
    );
    assert_eq!(outcome.retry_count, RagConfig::default().max_retries);
    assert_eq!(outcome.steps.iter().filter(|s| s.as_str() == FALLBACK).count(), 2);
    assert_eq!(outcome.steps.last().map(String::as_str), Some(FINALIZE));
    assert_eq!(outcome.state.relevance_verdict, Some(RelevanceVerdict::NotRelevant));
    assert_eq!(
        outcome.state.search_query,
        format!("{}{}", OFF_TOPIC, FALLBACK_SUFFIX)
    );
    assert!(store
        .queries()
        .contains(&format!("{}{}", OFF_TOPIC, FALLBACK_SUFFIX)));
}

/// **Scenario**: Under always-negative grounding, generate runs max_retries + 1 times.
#[tokio::test]
async fn loop_is_bounded_by_max_retries() {
    for max_retries in [0u32, 1, 2, 3] {
        let llm = never_grounded_llm();
        let store = corpus_store().await;
        let config = RagConfig {
            max_retries,
            ..RagConfig::default()
        };

        let outcome = runner_with(llm.clone(), store, config)
            .invoke("What is LangGraph?", None)
            .await
            .unwrap();

        let generates = outcome.steps.iter().filter(|s| s.as_str() == GENERATE).count();
        assert_eq!(generates as u32, max_retries + 1, "max_retries={}", max_retries);
        assert_eq!(
            llm.calls_containing("Answer the question using only the context") as u32,
            max_retries + 1
        );
        assert_eq!(outcome.retry_count, max_retries);
        assert_eq!(outcome.answer, prompts::not_found("What is LangGraph?"));
    }
}

/// **Scenario**: The retry counter never decreases during a run and never passes the maximum.
#[tokio::test]
async fn retry_counter_is_monotonic() {
    let llm = nothing_relevant_llm();
    let store = corpus_store().await;
    let runner = runner(llm, store);

    let mut counters = Vec::new();
    runner
        .stream_with_callback(
            OFF_TOPIC,
            None,
            Some(|event: StreamEvent<PipelineState>| {
                if let StreamEvent::Values(state) = event {
                    counters.push(state.retry_counter);
                }
            }),
        )
        .await
        .unwrap();

    assert!(!counters.is_empty());
    assert!(counters.windows(2).all(|w| w[0] <= w[1]), "{:?}", counters);
    assert_eq!(counters.last().copied(), Some(runner.config().max_retries));
}

/// **Scenario**: With max_retries = 0 a not-relevant grade goes straight to finalize.
#[tokio::test]
async fn zero_retries_finalizes_immediately() {
    let llm = nothing_relevant_llm();
    let store = corpus_store().await;
    let config = RagConfig {
        max_retries: 0,
        ..RagConfig::default()
    };

    let outcome = runner_with(llm.clone(), store, config)
        .invoke(OFF_TOPIC, None)
        .await
        .unwrap();

    assert!(!outcome.steps.iter().any(|s| s == FALLBACK || s == GENERATE));
    assert_eq!(outcome.retry_count, 0);
    assert_eq!(outcome.answer, prompts::not_found(OFF_TOPIC));
}

/// **Scenario**: Large retry budgets still end at the canned answer instead of a runtime error.
#[tokio::test]
async fn large_retry_budget_still_finalizes() {
    for max_retries in [6u32, 8, 12] {
        let llm = never_grounded_llm();
        let store = corpus_store().await;
        let config = RagConfig {
            max_retries,
            ..RagConfig::default()
        };

        let outcome = runner_with(llm, store, config)
            .invoke("What is LangGraph?", None)
            .await
            .unwrap_or_else(|e| panic!("max_retries={}: {}", max_retries, e));

        let generates = outcome.steps.iter().filter(|s| s.as_str() == GENERATE).count();
        assert_eq!(generates as u32, max_retries + 1);
        assert_eq!(outcome.retry_count, max_retries);
        assert_eq!(outcome.steps.last().map(String::as_str), Some(FINALIZE));
        assert_eq!(outcome.answer, prompts::not_found("What is LangGraph?"));
    }
}

/// **Scenario**: A hallucinated first answer is replaced after one fallback by a grounded one.
#[tokio::test]
async fn hallucinated_answer_recovers_after_one_retry() {
    const WRONG: &str = "LangGraph was invented in 1850.";
    const RIGHT: &str = "LangGraph is a stateful agent framework.";
    let llm = Arc::new(
        MockLlm::new("unused")
            .when("Classify the complexity", "moderate")
            .when(
                "Extract the named entities",
                r#"{"entities": [{"name": "LangGraph", "type": "technology"}]}"#,
            )
            .when("Grade whether the document is relevant", "yes")
            .when_sequence("Answer the question using only the context", [WRONG, RIGHT])
            .when_sequence("Check whether the answer is grounded", ["hallucinated", "grounded"]),
    );
    let store = corpus_store().await;

    let outcome = runner(llm.clone(), store)
        .invoke("What is LangGraph?", None)
        .await
        .unwrap();

    assert_eq!(outcome.answer, RIGHT);
    assert_eq!(outcome.retry_count, 1);
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
            FALLBACK,
            GENERATE,
            CHECK,
            FINALIZE,
        ])
    );
    assert_eq!(
        outcome.state.hallucination_verdict,
        Some(HallucinationVerdict::Grounded)
    );
    assert_eq!(llm.calls_containing("Answer the question using only the context"), 2);
    assert_eq!(llm.calls_containing("Check whether the answer is grounded"), 2);
    assert_eq!(
        outcome.state.search_query,
        format!("What is LangGraph?{}", FALLBACK_SUFFIX)
    );
}

/// **Scenario**: With the hypothetical-document rewrite, each fallback searches with the model's passage.
#[tokio::test]
async fn hypothetical_rewrite_searches_with_generated_passage() {
    const PASSAGE: &str = "Pasta recipes combine durum wheat noodles with a tomato sauce.";
    let llm = Arc::new(
        MockLlm::new("no")
            .when("Classify the complexity", "moderate")
            .when("Extract the named entities", "{\"entities\": []}")
            .when("Write a short passage", PASSAGE),
    );
    let store = corpus_store().await;
    let config = RagConfig {
        query_rewrite: QueryRewrite::Hypothetical,
        ..RagConfig::default()
    };

    let outcome = runner_with(llm.clone(), store.clone(), config)
        .invoke(OFF_TOPIC, None)
        .await
        .unwrap();

    assert_eq!(outcome.state.search_query, PASSAGE);
    assert_eq!(llm.calls_containing("Write a short passage"), 2);
    let queries = store.queries();
    assert_eq!(queries.iter().filter(|q| q.as_str() == PASSAGE).count(), 2);
    assert!(!queries.iter().any(|q| q.ends_with(FALLBACK_SUFFIX)));
    assert_eq!(outcome.answer, prompts::not_found(OFF_TOPIC));
}

/// **Scenario**: A blank hypothetical passage falls back to the suffixed query.
#[tokio::test]
async fn blank_hypothetical_passage_uses_suffix() {
    let llm = Arc::new(
        MockLlm::new("no")
            .when("Classify the complexity", "moderate")
            .when("Extract the named entities", "{\"entities\": []}")
            .when("Write a short passage", "   "),
    );
    let store = corpus_store().await;
    let config = RagConfig {
        query_rewrite: QueryRewrite::Hypothetical,
        max_retries: 1,
        ..RagConfig::default()
    };

    let outcome = runner_with(llm, store.clone(), config)
        .invoke(OFF_TOPIC, None)
        .await
        .unwrap();

    let suffixed = format!("{}{}", OFF_TOPIC, FALLBACK_SUFFIX);
    assert_eq!(outcome.state.search_query, suffixed);
    assert!(store.queries().contains(&suffixed));
}
