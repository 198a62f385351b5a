//! Built-in sample corpus, indexed when no `--no-sample-corpus` is given.
//!
//! Each entry carries comma-joined entity tags under the `entities` metadata
//! key so entity search has something to match.

use adaptive_rag::rag::ENTITY_METADATA_KEY;
use adaptive_rag::Document;

const SAMPLES: &[(&str, &str)] = &[
    (
        "LangGraph is a stateful agent framework developed by the LangChain team. \
         It models an agent as a graph of nodes that read and update a shared state.",
        "LangGraph,LangChain",
    ),
    (
        "RAG (retrieval-augmented generation) improves LLM answers by retrieving \
         external knowledge and passing it to the model as context.",
        "RAG,LLM",
    ),
    (
        "ChromaDB is an open-source vector database commonly used together with LangChain \
         to store embeddings and run similarity search.",
        "ChromaDB,LangChain",
    ),
    (
        "OpenAI is the AI research company that developed GPT-4 and ChatGPT.",
        "OpenAI,GPT-4,ChatGPT",
    ),
    (
        "Self-RAG is a technique in which the LLM decides for itself whether retrieval \
         is needed and critiques its own output.",
        "Self-RAG,LLM",
    ),
    (
        "Corrective RAG is a pattern that grades the quality of retrieved documents and \
         searches again with a rewritten query when they are not relevant.",
        "Corrective RAG,RAG",
    ),
    (
        "LangChain is a framework for building applications with large language models, \
         providing prompt templates, retrievers and integrations with vector stores.",
        "LangChain,LLM",
    ),
    (
        "Embeddings map text to vectors so that semantically similar passages are close \
         together; cosine similarity is the usual measure.",
        "Embeddings",
    ),
    (
        "A hallucination is an answer that is not supported by the provided documents; \
         grounding checks compare each claim against the retrieved context.",
        "Hallucination,LLM",
    ),
    (
        "Adaptive RAG classifies each question by complexity and picks a strategy: \
         answer directly, hybrid retrieval, or multi-step decomposition.",
        "Adaptive RAG,RAG",
    ),
];

/// Sample documents with entity tags.
pub fn sample_documents() -> Vec<Document> {
    SAMPLES
        .iter()
        .map(|(text, tags)| {
            Document::new(*text)
                .with_metadata(ENTITY_METADATA_KEY, *tags)
                .with_metadata("source", "sample")
        })
        .collect()
}
