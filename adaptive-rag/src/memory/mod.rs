//! # Memory: checkpoints and the retrieval corpus
//!
//! Two independent capabilities:
//!
//! 1. **Checkpointer**: per-session snapshots of the final pipeline state, keyed by
//!    `RunnableConfig::thread_id`. The runner reads the latest one to carry
//!    conversation history into the next query.
//! 2. **Vector store**: the document corpus the pipeline searches. Documents carry
//!    string metadata; entity search relies on a comma-joined tag field (`entities`).
//!
//! ## Implementations
//!
//! | Type                    | Kind         | Feature            |
//! |-------------------------|--------------|--------------------|
//! | [`MemorySaver`]         | Checkpointer | (always)           |
//! | `InMemoryVectorStore`   | VectorStore  | `in-memory-vector` |
//! | [`TimeoutVectorStore`]  | decorator    | (always)           |
//! | `OpenAIEmbedder`        | Embedder     | `openai`           |

mod checkpoint;
mod checkpointer;
mod config;
mod embedder;
mod memory_saver;
mod timeout_store;
mod vector_store;

#[cfg(feature = "in-memory-vector")]
mod in_memory_vector_store;
#[cfg(feature = "openai")]
mod openai_embedder;

pub use checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use embedder::Embedder;
pub use memory_saver::MemorySaver;
pub use timeout_store::TimeoutVectorStore;
pub use vector_store::{Document, SearchHit, StoreError, VectorStore};

#[cfg(feature = "in-memory-vector")]
pub use in_memory_vector_store::InMemoryVectorStore;
#[cfg(feature = "openai")]
pub use openai_embedder::OpenAIEmbedder;
