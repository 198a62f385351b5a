//! Simple queries are answered without touching the store.

use adaptive_rag::rag::{CLASSIFY, DIRECT};
use adaptive_rag::{Complexity, MockLlm, Strategy};
use std::sync::Arc;

use crate::common::{corpus_store, runner, steps};

/// **Scenario**: A greeting is classified simple and answered directly with no search calls.
#[tokio::test]
async fn greeting_is_answered_without_search() {
    let llm = Arc::new(
        MockLlm::new("unused")
            .when("Classify the complexity", "simple")
            .when("Answer the user's question directly", "Hello! How can I help you today?"),
    );
    let store = corpus_store().await;

    let outcome = runner(llm.clone(), store.clone())
        .invoke("안녕하세요", None)
        .await
        .unwrap();

    assert_eq!(outcome.answer, "Hello! How can I help you today?");
    assert_eq!(outcome.complexity, Complexity::Simple);
    assert_eq!(outcome.strategy, Strategy::Direct);
    assert_eq!(outcome.steps, steps(&[CLASSIFY, DIRECT]));
    assert!(store.queries().is_empty(), "{:?}", store.queries());
    assert_eq!(llm.call_count(), 2);
}

/// **Scenario**: An unrecognized classifier label falls back to the hybrid path.
#[tokio::test]
async fn unknown_label_defaults_to_hybrid() {
    let llm = Arc::new(
        MockLlm::new("no")
            .when("Classify the complexity", "I'm not sure about that one")
            .when("Extract the named entities", "{\"entities\": []}"),
    );
    let store = corpus_store().await;

    let outcome = runner(llm, store).invoke("tell me something", None).await.unwrap();

    assert_eq!(outcome.complexity, Complexity::Moderate);
    assert_eq!(outcome.strategy, Strategy::Hybrid);
}
