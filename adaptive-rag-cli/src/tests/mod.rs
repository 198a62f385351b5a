//! Unit tests for adaptive-rag-cli, organized by module.
//!
//! Each submodule documents the behaviour under test.


use std::sync::Arc;

use adaptive_rag::memory::{Embedder, StoreError};
use adaptive_rag::InMemoryVectorStore;
use async_trait::async_trait;

use crate::config::RunConfig;

/// Counts a few fixed keywords; enough for deterministic ranking in tests.
pub(crate) struct KeywordEmbedder;

const KEYWORDS: &[&str] = &["langgraph", "rag", "chromadb", "openai", "llm", "langchain", "pasta"];

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                let mut v: Vec<f32> = KEYWORDS
                    .iter()
                    .map(|k| lower.matches(k).count() as f32)
                    .collect();
                v.push(1.0);
                v
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        KEYWORDS.len() + 1
    }
}

pub(crate) fn keyword_store() -> Arc<InMemoryVectorStore> {
    Arc::new(InMemoryVectorStore::new(Arc::new(KeywordEmbedder)))
}

/// Config as if only `OPENAI_API_KEY` were set.
pub(crate) fn test_config() -> RunConfig {
    RunConfig::from_lookup(|key| (key == "OPENAI_API_KEY").then(|| "test-key".to_string()))
        .unwrap()
}
