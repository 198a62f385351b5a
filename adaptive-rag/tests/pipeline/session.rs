//! Sessions: history carried across queries, per-query fields reset.

use std::sync::Arc;

use adaptive_rag::rag::prompts;
use adaptive_rag::{AdaptiveRagRunner, MemorySaver, Message, MockLlm, RagConfig};

use crate::common::corpus_store;

/// **Scenario**: After an exhausted fallback loop, the next query in the session starts
/// with a zero counter but keeps the conversation.
#[tokio::test]
async fn counter_resets_and_history_carries_over() {
    let llm = Arc::new(
        MockLlm::new("no")
            .when(format!("{}\nthanks", prompts::CLASSIFY_PROMPT), "simple")
            .when("Classify the complexity", "moderate")
            .when("Extract the named entities", "{\"entities\": []}")
            .when("Answer the user's question directly", "You're welcome!"),
    );
    let store = corpus_store().await;
    let runner = AdaptiveRagRunner::new(
        llm.clone(),
        store,
        RagConfig::default(),
        Some(Arc::new(MemorySaver::new())),
        false,
    )
    .unwrap();

    let first = runner
        .invoke("What is the best pasta recipe?", Some("s1"))
        .await
        .unwrap();
    assert_eq!(first.retry_count, 2);

    let second = runner.invoke("thanks", Some("s1")).await.unwrap();
    assert_eq!(second.answer, "You're welcome!");
    assert_eq!(second.retry_count, 0);
    assert!(second.state.relevance_verdict.is_none());
    assert_eq!(
        second.state.history[..2],
        [
            Message::user("What is the best pasta recipe?"),
            Message::assistant(first.answer.clone()),
        ]
    );

    let direct_prompt = llm.calls().last().cloned().unwrap();
    assert!(direct_prompt.contains(&Message::assistant(first.answer)));
}

/// **Scenario**: Different sessions do not share history.
#[tokio::test]
async fn sessions_are_isolated() {
    let llm = Arc::new(
        MockLlm::new("hi")
            .when("Classify the complexity", "simple"),
    );
    let store = corpus_store().await;
    let runner = AdaptiveRagRunner::new(
        llm,
        store,
        RagConfig::default(),
        Some(Arc::new(MemorySaver::new())),
        false,
    )
    .unwrap();

    runner.invoke("hello", Some("a")).await.unwrap();
    let other = runner.invoke("hello", Some("b")).await.unwrap();
    assert_eq!(other.state.history.len(), 2);
}
