//! Per-call timeout decorator for any `VectorStore`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{Document, SearchHit, StoreError, VectorStore};

/// Wraps a vector store so each call fails with `StoreError::Timeout` after `timeout`.
pub struct TimeoutVectorStore {
    inner: Arc<dyn VectorStore>,
    timeout: Duration,
}

impl TimeoutVectorStore {
    pub fn new(inner: Arc<dyn VectorStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "vector store call timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl VectorStore for TimeoutVectorStore {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, StoreError> {
        self.bounded("add_documents", self.inner.add_documents(documents))
            .await
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, StoreError> {
        self.bounded("search", self.inner.search(query, k)).await
    }

    async fn len(&self) -> Result<usize, StoreError> {
        self.bounded("len", self.inner.len()).await
    }
}
