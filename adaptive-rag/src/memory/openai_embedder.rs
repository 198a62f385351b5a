//! OpenAI embeddings client implementing `Embedder`.

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client,
};
use async_trait::async_trait;

use super::{Embedder, StoreError};

/// Dimension of `text-embedding-3-small`; used when the model is unknown.
const DEFAULT_DIMENSION: usize = 1536;

/// Embeddings over any OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl OpenAIEmbedder {
    /// API key from `OPENAI_API_KEY`.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    /// Custom API key or base URL (e.g. `OPENAI_EMBEDDING_API_BASE`).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimension = match model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => DEFAULT_DIMENSION,
        };
        Self {
            client: Client::with_config(config),
            model,
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let input: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(EmbeddingInput::StringArray(input))
            .build()
            .map_err(|e| StoreError::Embedding(format!("request build failed: {}", e)))?;

        tracing::trace!(model = %self.model, inputs = texts.len(), "embedding request");

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| StoreError::Embedding(format!("OpenAI API error: {}", e)))?;

        let mut data = response.data;
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
