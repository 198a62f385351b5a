//! Text → vector embedding interface used by vector store implementations.

use async_trait::async_trait;

use super::StoreError;

/// Produces one vector per input text, all of length `dimension()`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError>;

    fn dimension(&self) -> usize;
}
