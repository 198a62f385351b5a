//! Vector store collaborator: index documents, answer nearest-neighbor queries.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vector store or embedding failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The embedder failed or returned fewer vectors than inputs.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// Backend failure (connection, query, index).
    #[error("storage error: {0}")]
    Storage(String),
    /// The call did not finish within the configured limit.
    #[error("vector store call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A document to index: text plus string metadata (e.g. `entities`, `source`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Adds one metadata entry (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One search result, ranked by `score` (higher is more similar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    pub metadata: HashMap<String, String>,
    pub score: f32,
}

/// Nearest-neighbor text search over an indexed corpus.
///
/// **Interaction**: Shared as `Arc<dyn VectorStore>` by the entity search,
/// semantic search, fallback and complex-path search nodes. Reads are
/// side-effect free and may run concurrently.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Indexes documents; returns their ids in input order.
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, StoreError>;

    /// Returns at most `k` hits for `query`, most similar first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, StoreError>;

    /// Number of indexed documents.
    async fn len(&self) -> Result<usize, StoreError>;
}
