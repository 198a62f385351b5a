//! Run entry points: build the runner from config, index the corpus, answer
//! one query or drive the REPL.
//!
//! Re-exports [`run`], [`run_with_options`], [`repl`] and [`Error`].

pub use crate::config::Error;

mod repl;

pub use repl::{format_outcome, is_quit, repl, QUIT_COMMANDS};

use std::sync::Arc;

use adaptive_rag::memory::Checkpointer;
use adaptive_rag::stream::StreamEvent;
use adaptive_rag::{
    load_path, AdaptiveRagRunner, LlmClient, MemorySaver, PipelineState, RagOutcome,
    RecursiveTextSplitter, VectorStore,
};

use crate::config::{RunConfig, RunOptions};
use crate::corpus::sample_documents;

/// Adds the sample corpus (unless disabled) and every `docs` path to `store`.
/// Returns the number of documents indexed.
pub async fn index_corpus(store: &dyn VectorStore, config: &RunConfig) -> Result<usize, Error> {
    let mut documents = if config.sample_corpus {
        sample_documents()
    } else {
        Vec::new()
    };
    let splitter = RecursiveTextSplitter::default();
    for path in &config.docs {
        documents.extend(load_path(path, &splitter).await?);
    }
    let count = documents.len();
    if count == 0 {
        tracing::warn!("no documents indexed; every retrieval will come back empty");
    } else {
        store.add_documents(documents).await?;
        tracing::info!(documents = count, "corpus indexed");
    }
    Ok(count)
}

/// Builds the runner over the given model and store. A session id in the
/// config turns on the in-memory checkpointer.
pub fn build_runner_with(
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn VectorStore>,
    config: &RunConfig,
) -> Result<AdaptiveRagRunner, Error> {
    let checkpointer = config.session.as_ref().map(|_| {
        Arc::new(MemorySaver::<PipelineState>::new()) as Arc<dyn Checkpointer<PipelineState>>
    });
    let runner = AdaptiveRagRunner::new(
        llm,
        store,
        config.rag_config(),
        checkpointer,
        config.verbose,
    )?;
    Ok(runner)
}

/// Builds the OpenAI-backed runner and indexes the corpus into an in-memory store.
pub async fn build_runner(config: &RunConfig) -> Result<AdaptiveRagRunner, Error> {
    use adaptive_rag::{ChatOpenAI, InMemoryVectorStore, OpenAIEmbedder};
    use async_openai::config::OpenAIConfig;

    let chat_config = OpenAIConfig::new()
        .with_api_base(&config.api_base)
        .with_api_key(config.api_key.clone());
    let mut llm = ChatOpenAI::with_config(chat_config, config.model.clone());
    if let Some(t) = config.temperature {
        llm = llm.with_temperature(t);
    }

    let embedding_config = OpenAIConfig::new()
        .with_api_base(config.embedding_api_base())
        .with_api_key(config.api_key.clone());
    let embedder = OpenAIEmbedder::with_config(embedding_config, config.embedding_model.clone());
    let store = Arc::new(InMemoryVectorStore::new(Arc::new(embedder)));
    index_corpus(store.as_ref(), config).await?;

    build_runner_with(Arc::new(llm), store, config)
}

/// Answers one query. When `verbose`, each finished step is reported on stderr.
pub async fn answer(
    runner: &AdaptiveRagRunner,
    query: &str,
    session: Option<&str>,
    verbose: bool,
) -> Result<RagOutcome, Error> {
    let outcome = if verbose {
        runner
            .stream_with_callback(
                query,
                session,
                Some(|event: StreamEvent<PipelineState>| {
                    if let StreamEvent::Updates { node_id, state } = event {
                        eprintln!("  [{}] retries={}", node_id, state.retry_counter);
                    }
                }),
            )
            .await?
    } else {
        runner.invoke(query, session).await?
    };
    Ok(outcome)
}

/// Answers `query` with config from `.env` / env, returns the outcome.
pub async fn run(query: &str) -> Result<RagOutcome, Error> {
    run_with_options(query, &RunOptions::default()).await
}

/// Like [`run`] with overrides applied on top of the env config.
pub async fn run_with_options(query: &str, options: &RunOptions) -> Result<RagOutcome, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    let runner = build_runner(&config).await?;
    answer(&runner, query, config.session.as_deref(), config.verbose).await
}
