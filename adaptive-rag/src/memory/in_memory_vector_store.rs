use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::memory::embedder::Embedder;
use crate::memory::vector_store::{Document, SearchHit, StoreError, VectorStore};

/// Pure in-memory vector store with cosine-similarity ranking.
///
/// **Interaction**: Used as `Arc<dyn VectorStore>` by the retrieval nodes; the CLI
/// fills it from the sample corpus and `--docs` files.
///
/// **In-Memory**: All data stored in memory, lost when store is dropped.
///
/// Hits with equal scores come back in insertion order.
pub struct InMemoryVectorStore {
    data: DashMap<String, VectorEntry>,
    embedder: Arc<dyn Embedder>,
    next_seq: AtomicU64,
}

#[derive(Clone)]
struct VectorEntry {
    seq: u64,
    vector: Vec<f32>,
    document: Document,
}

impl InMemoryVectorStore {
    /// Creates an empty store that embeds text with `embedder`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let embedder = Arc::new(OpenAIEmbedder::new("text-embedding-3-small"));
    /// let store = InMemoryVectorStore::new(embedder);
    /// ```
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            data: DashMap::new(),
            embedder,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Cosine similarity; 0.0 if either vector has zero magnitude.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(StoreError::Embedding(format!(
                "expected {} vectors, got {}",
                documents.len(),
                vectors.len()
            )));
        }

        let mut ids = Vec::with_capacity(documents.len());
        for (document, vector) in documents.into_iter().zip(vectors) {
            let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
            let id = format!("doc-{}", seq);
            self.data.insert(
                id.clone(),
                VectorEntry {
                    seq,
                    vector,
                    document,
                },
            );
            ids.push(id);
        }
        tracing::debug!(added = ids.len(), total = self.data.len(), "indexed documents");
        Ok(ids)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, StoreError> {
        if k == 0 || self.data.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self
            .embedder
            .embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding("no vector returned".into()))?;

        let mut scored: Vec<(f32, VectorEntry)> = self
            .data
            .iter()
            .map(|entry| {
                (
                    Self::cosine_similarity(&query_vec, &entry.vector),
                    entry.value().clone(),
                )
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.seq.cmp(&b.1.seq))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| SearchHit {
                text: entry.document.text,
                metadata: entry.document.metadata,
                score,
            })
            .collect())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.data.len())
    }
}
