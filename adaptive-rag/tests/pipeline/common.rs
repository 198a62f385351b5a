//! Shared fixtures: a bag-of-words embedder, a store that records queries and
//! the tagged sample corpus.

use std::sync::{Arc, Mutex};

use adaptive_rag::memory::{Document, Embedder, SearchHit, StoreError, VectorStore};
use adaptive_rag::{AdaptiveRagRunner, InMemoryVectorStore, MockLlm, RagConfig};
use async_trait::async_trait;

const DIM: usize = 256;

/// Hashes lowercase alphanumeric tokens into a fixed-size count vector.
pub struct WordEmbedder;

fn token_slot(token: &str) -> usize {
    let hash = token
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100_0000_01b3));
    (hash % DIM as u64) as usize
}

#[async_trait]
impl Embedder for WordEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0; DIM];
                for token in text
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| !t.is_empty())
                {
                    v[token_slot(&token.to_lowercase())] += 1.0;
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// Wraps a store and records every search query in call order.
pub struct RecordingStore {
    inner: InMemoryVectorStore,
    queries: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, StoreError> {
        self.inner.add_documents(documents).await
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, StoreError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.inner.search(query, k).await
    }

    async fn len(&self) -> Result<usize, StoreError> {
        self.inner.len().await
    }
}

pub const CORPUS: &[(&str, &str)] = &[
    (
        "LangGraph is a stateful agent framework developed by the LangChain team.",
        "LangGraph,LangChain",
    ),
    (
        "RAG (retrieval-augmented generation) improves LLM answers with external knowledge.",
        "RAG,LLM",
    ),
    (
        "ChromaDB is an open-source vector database often used with LangChain.",
        "ChromaDB,LangChain",
    ),
    (
        "OpenAI is the AI research company that developed GPT-4 and ChatGPT.",
        "OpenAI,GPT-4,ChatGPT",
    ),
    (
        "Self-RAG is a technique where the LLM decides for itself whether retrieval is needed.",
        "Self-RAG,LLM",
    ),
    (
        "Corrective RAG is a pattern that grades retrieval quality and searches again.",
        "Corrective RAG",
    ),
];

/// Store filled with [`CORPUS`], entity tags under `entities`.
pub async fn corpus_store() -> Arc<RecordingStore> {
    let store = RecordingStore {
        inner: InMemoryVectorStore::new(Arc::new(WordEmbedder)),
        queries: Mutex::new(Vec::new()),
    };
    let docs = CORPUS
        .iter()
        .map(|(text, tags)| Document::new(*text).with_metadata("entities", *tags))
        .collect();
    store.add_documents(docs).await.unwrap();
    Arc::new(store)
}

pub fn runner(llm: Arc<MockLlm>, store: Arc<RecordingStore>) -> AdaptiveRagRunner {
    runner_with(llm, store, RagConfig::default())
}

pub fn runner_with(
    llm: Arc<MockLlm>,
    store: Arc<RecordingStore>,
    config: RagConfig,
) -> AdaptiveRagRunner {
    AdaptiveRagRunner::new(llm, store, config, None, false).unwrap()
}

pub fn steps(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
