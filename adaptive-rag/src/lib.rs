//! # Adaptive RAG
//!
//! A retrieval-augmented question answering pipeline that picks its strategy
//! per query and corrects itself within a bounded number of retries, built on
//! a small **state-in, update-out** graph runtime.
//!
//! ## Design Principles
//!
//! - **Single state type**: every step reads [`PipelineState`] and returns a
//!   partial [`PipelineUpdate`]; the runtime applies updates after each superstep.
//! - **Real fan-out**: entity search and semantic search run as concurrent
//!   tasks and meet at an explicit join before merging.
//! - **Total parsing**: model output is parsed into closed enums with defaults;
//!   malformed output never fails a run.
//! - **Bounded loop**: fallback re-search runs at most `RagConfig::max_retries`
//!   times, then a canned answer is returned.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Next`, joins and middleware.
//! - [`rag`]: pipeline state, steps, routing, [`AdaptiveRagRunner`].
//! - [`llm`]: `LlmClient` trait, `MockLlm`, `TimeoutLlm`, optional `ChatOpenAI`.
//! - [`memory`]: checkpointer, `VectorStore`, embedders, in-memory store.
//! - [`loader`]: file loading and recursive text splitting.
//! - [`stream`]: events emitted by `CompiledStateGraph::stream`.
//!
//! ## Features
//!
//! - `in-memory-vector` (default): `InMemoryVectorStore` backed by `dashmap`.
//! - `openai`: `ChatOpenAI` and `OpenAIEmbedder` via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use adaptive_rag::{AdaptiveRagRunner, MockLlm, RagConfig};
//! # use adaptive_rag::memory::{Document, SearchHit, StoreError, VectorStore};
//! # struct NoDocs;
//! # #[async_trait::async_trait]
//! # impl VectorStore for NoDocs {
//! #     async fn add_documents(&self, _: Vec<Document>) -> Result<Vec<String>, StoreError> { Ok(vec![]) }
//! #     async fn search(&self, _: &str, _: usize) -> Result<Vec<SearchHit>, StoreError> { Ok(vec![]) }
//! #     async fn len(&self) -> Result<usize, StoreError> { Ok(0) }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let llm = Arc::new(MockLlm::new("Hi!").when("Classify the complexity", "simple"));
//! let runner = AdaptiveRagRunner::new(llm, Arc::new(NoDocs), RagConfig::default(), None, false).unwrap();
//! let outcome = runner.invoke("hello", None).await.unwrap();
//! println!("{} [{}]", outcome.answer, outcome.strategy);
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod llm;
pub mod loader;
pub mod memory;
pub mod message;
pub mod rag;
pub mod stream;

pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, GraphState, LoggingNodeMiddleware, Next, Node,
    NodeMiddleware, StateGraph, END, START,
};
pub use llm::{LlmClient, LlmResponse, MockLlm, TimeoutLlm};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use loader::{load_file, load_path, LoaderError, RecursiveTextSplitter};
pub use memory::{
    Checkpoint, CheckpointError, Checkpointer, Document, Embedder, MemorySaver, RunnableConfig,
    SearchHit, StoreError, TimeoutVectorStore, VectorStore,
};
#[cfg(feature = "in-memory-vector")]
pub use memory::InMemoryVectorStore;
#[cfg(feature = "openai")]
pub use memory::OpenAIEmbedder;
pub use message::Message;
pub use rag::{
    AdaptiveRagRunner, Complexity, PipelineState, PipelineUpdate, QueryRewrite, RagConfig,
    RagOutcome, RetrievedItem, RunError, Strategy,
};
pub use stream::{StreamEvent, StreamMode};
