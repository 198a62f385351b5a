//! Pipeline runner: builds the graph once, then answers queries with `invoke`
//! or `stream_with_callback`, carrying conversation history per session.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_stream::StreamExt;

use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, LoggingNodeMiddleware};
use crate::llm::{LlmClient, TimeoutLlm};
use crate::memory::{
    CheckpointError, Checkpointer, RunnableConfig, TimeoutVectorStore, VectorStore,
};
use crate::stream::{StreamEvent, StreamMode};

use super::config::RagConfig;
use super::graph::build_graph;
use super::state::{Complexity, PipelineState, Strategy};

/// Builds the initial state for `query`.
///
/// With a checkpointer and a config carrying `thread_id`, the latest checkpoint
/// of that session supplies the conversation history (trimmed to the last
/// `history_limit` messages); every per-query field starts fresh.
///
/// # Errors
///
/// Returns `CheckpointError` if loading the checkpoint fails.
pub async fn build_initial_state(
    query: &str,
    checkpointer: Option<&dyn Checkpointer<PipelineState>>,
    runnable_config: Option<&RunnableConfig>,
    history_limit: usize,
) -> Result<PipelineState, CheckpointError> {
    let session = runnable_config.filter(|c| c.thread_id.is_some());
    if let (Some(cp), Some(config)) = (checkpointer, session) {
        if let Some((checkpoint, _)) = cp.get_tuple(config).await? {
            let mut state = checkpoint.state.next_query(query);
            let excess = state.history.len().saturating_sub(history_limit);
            state.history.drain(..excess);
            return Ok(state);
        }
    }
    Ok(PipelineState::new(query))
}

/// Error type for AdaptiveRagRunner invoke/stream operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
    #[error("stream ended without final state")]
    StreamEndedWithoutState,
}

/// What a caller gets back for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct RagOutcome {
    pub answer: String,
    pub strategy: Strategy,
    pub complexity: Complexity,
    /// Node ids in execution order.
    pub steps: Vec<String>,
    /// Fallback iterations used; always `<= RagConfig::max_retries`.
    pub retry_count: u32,
    /// Full final state, for inspection.
    pub state: PipelineState,
}

impl RagOutcome {
    /// Reads the outcome out of a finished run's state.
    pub fn from_state(state: PipelineState) -> Result<Self, RunError> {
        let (Some(answer), Some(strategy), Some(complexity)) =
            (state.answer.clone(), state.strategy, state.complexity)
        else {
            return Err(RunError::Execution(AgentError::ExecutionFailed(
                "run finished without an answer".into(),
            )));
        };
        Ok(Self {
            answer,
            strategy,
            complexity,
            steps: state.steps.clone(),
            retry_count: state.retry_counter,
            state,
        })
    }
}

/// Adaptive RAG runner: the compiled pipeline plus optional session persistence.
///
/// # Example
///
/// ```ignore
/// let runner = AdaptiveRagRunner::new(llm, store, RagConfig::default(), None, false)?;
/// let outcome = runner.invoke("What is LangGraph?", None).await?;
/// println!("{} ({})", outcome.answer, outcome.strategy);
/// ```
pub struct AdaptiveRagRunner {
    compiled: CompiledStateGraph<PipelineState>,
    checkpointer: Option<Arc<dyn Checkpointer<PipelineState>>>,
    config: Arc<RagConfig>,
}

impl AdaptiveRagRunner {
    /// Builds and compiles the pipeline.
    ///
    /// When `config.call_timeout` is set, every LLM and store call is bounded by
    /// it. When `verbose` is true, node enter/exit is logged.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn VectorStore>,
        config: RagConfig,
        checkpointer: Option<Arc<dyn Checkpointer<PipelineState>>>,
        verbose: bool,
    ) -> Result<Self, CompilationError> {
        let (llm, store): (Arc<dyn LlmClient>, Arc<dyn VectorStore>) = match config.call_timeout {
            Some(timeout) => (
                Arc::new(TimeoutLlm::new(llm, timeout)),
                Arc::new(TimeoutVectorStore::new(store, timeout)),
            ),
            None => (llm, store),
        };
        let config = Arc::new(config);
        let graph = build_graph(llm, store, Arc::clone(&config));

        let compiled = match (&checkpointer, verbose) {
            (Some(cp), true) => graph.compile_with_checkpointer_and_middleware(
                Arc::clone(cp),
                Arc::new(LoggingNodeMiddleware),
            )?,
            (Some(cp), false) => graph.compile_with_checkpointer(Arc::clone(cp))?,
            (None, true) => graph.compile_with_middleware(Arc::new(LoggingNodeMiddleware))?,
            (None, false) => graph.compile()?,
        };

        Ok(Self {
            compiled,
            checkpointer,
            config,
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    fn runnable_config(session: Option<&str>) -> Option<RunnableConfig> {
        session.map(RunnableConfig::for_thread)
    }

    async fn initial_state(
        &self,
        query: &str,
        runnable_config: Option<&RunnableConfig>,
    ) -> Result<PipelineState, CheckpointError> {
        build_initial_state(
            query,
            self.checkpointer.as_deref(),
            runnable_config,
            self.config.history_limit,
        )
        .await
    }

    /// Answers `query`. With `session`, history from earlier queries of that
    /// session is loaded first and the final state is saved afterwards.
    pub async fn invoke(&self, query: &str, session: Option<&str>) -> Result<RagOutcome, RunError> {
        let runnable_config = Self::runnable_config(session);
        let state = self.initial_state(query, runnable_config.as_ref()).await?;
        let final_state = self.compiled.invoke(state, runnable_config).await?;
        RagOutcome::from_state(final_state)
    }

    /// Like [`invoke`](Self::invoke) but reports progress: `on_event` receives
    /// an `Updates` event per finished node and a `Values` event per superstep.
    pub async fn stream_with_callback<F>(
        &self,
        query: &str,
        session: Option<&str>,
        mut on_event: Option<F>,
    ) -> Result<RagOutcome, RunError>
    where
        F: FnMut(StreamEvent<PipelineState>),
    {
        let runnable_config = Self::runnable_config(session);
        let state = self.initial_state(query, runnable_config.as_ref()).await?;

        let modes = HashSet::from([StreamMode::Updates, StreamMode::Values]);
        let mut stream = self.compiled.stream(state, runnable_config, modes);

        let mut final_state: Option<PipelineState> = None;
        while let Some(event) = stream.next().await {
            let event = match event {
                StreamEvent::Error(err) => {
                    let err = Arc::try_unwrap(err)
                        .unwrap_or_else(|shared| AgentError::ExecutionFailed(shared.to_string()));
                    return Err(RunError::Execution(err));
                }
                other => other,
            };
            if let Some(ref mut f) = on_event {
                f(event.clone());
            }
            if let StreamEvent::Values(s) = event {
                final_state = Some(s);
            }
        }

        let final_state = final_state.ok_or(RunError::StreamEndedWithoutState)?;
        RagOutcome::from_state(final_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::memory::{
        Checkpoint, CheckpointSource, Document, MemorySaver, SearchHit, StoreError,
    };
    use crate::message::Message;
    use crate::rag::{CLASSIFY, DIRECT};
    use crate::MockLlm;

    struct EmptyStore;

    #[async_trait]
    impl VectorStore for EmptyStore {
        async fn add_documents(&self, _documents: Vec<Document>) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }

        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<SearchHit>, StoreError> {
            Ok(Vec::new())
        }

        async fn len(&self) -> Result<usize, StoreError> {
            Ok(0)
        }
    }

    fn simple_llm() -> Arc<MockLlm> {
        Arc::new(
            MockLlm::new("Hello there!").when("Classify the complexity", "simple"),
        )
    }

    /// **Scenario**: A simple query returns the direct answer with its strategy and path.
    #[tokio::test]
    async fn invoke_simple_query() {
        let runner = AdaptiveRagRunner::new(
            simple_llm(),
            Arc::new(EmptyStore),
            RagConfig::default(),
            None,
            false,
        )
        .unwrap();
        let outcome = runner.invoke("hi", None).await.unwrap();
        assert_eq!(outcome.answer, "Hello there!");
        assert_eq!(outcome.strategy, Strategy::Direct);
        assert_eq!(outcome.complexity, Complexity::Simple);
        assert_eq!(outcome.steps, vec![CLASSIFY.to_string(), DIRECT.to_string()]);
        assert_eq!(outcome.retry_count, 0);
    }

    /// **Scenario**: Verbose runners compile with logging middleware and still answer.
    #[tokio::test]
    async fn verbose_runner_answers() {
        let runner = AdaptiveRagRunner::new(
            simple_llm(),
            Arc::new(EmptyStore),
            RagConfig::default(),
            Some(Arc::new(MemorySaver::new())),
            true,
        )
        .unwrap();
        let outcome = runner.invoke("hi", Some("s")).await.unwrap();
        assert_eq!(outcome.strategy, Strategy::Direct);
    }

    /// **Scenario**: A session carries history into the next query's direct prompt.
    #[tokio::test]
    async fn session_history_reaches_next_query() {
        let llm = simple_llm();
        let saver: Arc<dyn Checkpointer<PipelineState>> = Arc::new(MemorySaver::new());
        let runner = AdaptiveRagRunner::new(
            llm.clone(),
            Arc::new(EmptyStore),
            RagConfig::default(),
            Some(saver),
            false,
        )
        .unwrap();

        runner.invoke("my name is Ada", Some("s1")).await.unwrap();
        let second = runner.invoke("what is my name?", Some("s1")).await.unwrap();

        assert_eq!(second.state.query, "what is my name?");
        assert_eq!(second.state.history.len(), 4);
        let last_prompt = llm.calls().last().cloned().unwrap();
        assert!(last_prompt.contains(&Message::user("my name is Ada")));
    }

    /// **Scenario**: Without a session nothing is loaded, even with a checkpointer.
    #[tokio::test]
    async fn no_session_starts_fresh() {
        let saver = MemorySaver::<PipelineState>::new();
        let mut prior = PipelineState::new("old");
        prior.history = vec![Message::user("old")];
        let config = RunnableConfig::for_thread("s");
        saver
            .put(&config, &Checkpoint::from_state(prior, CheckpointSource::Update, 1))
            .await
            .unwrap();

        let fresh = build_initial_state("new", Some(&saver), None, 10).await.unwrap();
        assert!(fresh.history.is_empty());

        let resumed = build_initial_state("new", Some(&saver), Some(&config), 10)
            .await
            .unwrap();
        assert_eq!(resumed.history, vec![Message::user("old")]);
        assert_eq!(resumed.query, "new");
    }

    /// **Scenario**: Loaded history is trimmed to the most recent history_limit messages.
    #[tokio::test]
    async fn loaded_history_is_trimmed() {
        let saver = MemorySaver::<PipelineState>::new();
        let mut prior = PipelineState::new("old");
        prior.history = (0..6).map(|i| Message::user(i.to_string())).collect();
        let config = RunnableConfig::for_thread("s");
        saver
            .put(&config, &Checkpoint::from_state(prior, CheckpointSource::Update, 1))
            .await
            .unwrap();

        let state = build_initial_state("new", Some(&saver), Some(&config), 4)
            .await
            .unwrap();
        let kept: Vec<_> = state.history.iter().map(|m| m.content().to_string()).collect();
        assert_eq!(kept, vec!["2", "3", "4", "5"]);
    }

    /// **Scenario**: The compiled superstep limit follows max_retries; the rerank variant compiles.
    #[test]
    fn recursion_limit_follows_max_retries() {
        for (max_retries, rerank_top_n) in [(2, None), (8, Some(3))] {
            let config = RagConfig {
                max_retries,
                rerank_top_n,
                ..RagConfig::default()
            };
            let expected = config.recursion_limit();
            let runner =
                AdaptiveRagRunner::new(simple_llm(), Arc::new(EmptyStore), config, None, false)
                    .unwrap();
            assert_eq!(runner.compiled.recursion_limit(), expected);
        }
    }

    /// **Scenario**: stream_with_callback reports each node and returns the same outcome.
    #[tokio::test]
    async fn stream_reports_updates() {
        let runner = AdaptiveRagRunner::new(
            simple_llm(),
            Arc::new(EmptyStore),
            RagConfig::default(),
            None,
            false,
        )
        .unwrap();
        let mut nodes = Vec::new();
        let outcome = runner
            .stream_with_callback(
                "hi",
                None,
                Some(|event: StreamEvent<PipelineState>| {
                    if let StreamEvent::Updates { node_id, .. } = event {
                        nodes.push(node_id);
                    }
                }),
            )
            .await
            .unwrap();
        assert_eq!(nodes, vec![CLASSIFY.to_string(), DIRECT.to_string()]);
        assert_eq!(outcome.answer, "Hello there!");
    }

    /// **Scenario**: A failing model surfaces as RunError::Execution from both entry points.
    #[tokio::test]
    async fn llm_failure_is_execution_error() {
        let runner = AdaptiveRagRunner::new(
            Arc::new(MockLlm::failing("endpoint down")),
            Arc::new(EmptyStore),
            RagConfig::default(),
            None,
            false,
        )
        .unwrap();
        let err = runner.invoke("hi", None).await.unwrap_err();
        assert!(matches!(err, RunError::Execution(_)), "{:?}", err);
        assert!(err.to_string().contains("endpoint down"), "{}", err);

        let err = runner
            .stream_with_callback("hi", None, None::<fn(StreamEvent<PipelineState>)>)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("endpoint down"), "{}", err);
    }

    struct SlowLlm;

    #[async_trait]
    impl LlmClient for SlowLlm {
        async fn invoke(&self, _messages: &[Message]) -> Result<crate::llm::LlmResponse, AgentError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(crate::llm::LlmResponse::default())
        }
    }

    /// **Scenario**: call_timeout turns a hung model call into a Timeout error.
    #[tokio::test(start_paused = true)]
    async fn call_timeout_applies() {
        let config = RagConfig {
            call_timeout: Some(Duration::from_secs(2)),
            ..RagConfig::default()
        };
        let runner =
            AdaptiveRagRunner::new(Arc::new(SlowLlm), Arc::new(EmptyStore), config, None, false)
                .unwrap();
        let err = runner.invoke("hi", None).await.unwrap_err();
        assert!(
            matches!(err, RunError::Execution(AgentError::Timeout { .. })),
            "{:?}",
            err
        );
    }

    /// **Scenario**: The streaming entry point keeps the Timeout variant instead of a generic failure.
    #[tokio::test(start_paused = true)]
    async fn call_timeout_applies_when_streaming() {
        let config = RagConfig {
            call_timeout: Some(Duration::from_secs(2)),
            ..RagConfig::default()
        };
        let runner =
            AdaptiveRagRunner::new(Arc::new(SlowLlm), Arc::new(EmptyStore), config, None, true)
                .unwrap();
        let err = runner
            .stream_with_callback("hi", None, None::<fn(StreamEvent<PipelineState>)>)
            .await
            .unwrap_err();
        assert!(
            matches!(err, RunError::Execution(AgentError::Timeout { .. })),
            "{:?}",
            err
        );
    }
}
