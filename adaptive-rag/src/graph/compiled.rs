//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile*`. Execution proceeds in supersteps: every
//! active node runs against the same state snapshot (as spawned tokio tasks when
//! more than one is active), their updates are applied in schedule order, then
//! successors are computed from `Next`, routers, static edges and joins.
//! When a checkpointer is set and config.thread_id is provided, the final state
//! is saved after the run.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_superstep,
};
use super::node_middleware::{NodeMiddleware, NodeOutput, NodeRunFn};
use super::{GraphState, Next, Node, END};

/// Router callback for conditional edges: state after the superstep → path key.
pub(super) type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

pub(super) struct ConditionalEdges<S> {
    pub(super) router: Router<S>,
    pub(super) path_map: HashMap<String, String>,
}

impl<S> Clone for ConditionalEdges<S> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            path_map: self.path_map.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct Join {
    pub(super) sources: Vec<String>,
    pub(super) target: String,
}

/// Compiled graph: immutable structure, supports invoke and stream.
///
/// Created by `StateGraph::compile()` and friends. Cheap to clone; the
/// streaming run owns a clone.
pub struct CompiledStateGraph<S>
where
    S: GraphState,
{
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) entry: String,
    pub(super) edges: HashMap<String, Vec<String>>,
    pub(super) routers: HashMap<String, ConditionalEdges<S>>,
    pub(super) joins: Vec<Join>,
    pub(super) recursion_limit: usize,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> Clone for CompiledStateGraph<S>
where
    S: GraphState,
{
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            entry: self.entry.clone(),
            edges: self.edges.clone(),
            routers: self.routers.clone(),
            joins: self.joins.clone(),
            recursion_limit: self.recursion_limit,
            checkpointer: self.checkpointer.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

/// Where a streaming run sends its events.
struct EventSink<S>
where
    S: GraphState,
{
    tx: mpsc::Sender<StreamEvent<S>>,
    modes: HashSet<StreamMode>,
}

impl<S> EventSink<S>
where
    S: GraphState,
{
    async fn emit(&self, node_id: &str, state: &S) {
        if self.modes.contains(&StreamMode::Values) {
            let _ = self.tx.send(StreamEvent::Values(state.clone())).await;
        }
        if self.modes.contains(&StreamMode::Updates) {
            let _ = self
                .tx
                .send(StreamEvent::Updates {
                    node_id: node_id.to_string(),
                    state: state.clone(),
                })
                .await;
        }
    }
}

/// Runs one node, through the middleware when present.
async fn run_node<S>(
    node_id: String,
    node: Arc<dyn Node<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    snapshot: Arc<S>,
) -> NodeOutput<S>
where
    S: GraphState,
{
    log_node_start(&node_id);
    let output = match middleware {
        Some(middleware) => {
            let inner: NodeRunFn<S> = Box::new(move |s: Arc<S>| {
                Box::pin(async move { node.run(&s).await })
                    as Pin<Box<dyn Future<Output = NodeOutput<S>> + Send>>
            });
            middleware.around_run(&node_id, snapshot, inner).await
        }
        None => node.run(&snapshot).await,
    };
    if let Ok((_, next)) = &output {
        log_node_complete(&node_id, next);
    }
    output
}

impl<S> CompiledStateGraph<S>
where
    S: GraphState,
{
    /// Runs all `active` nodes against `snapshot`; outputs keep the order of `active`.
    async fn run_superstep(
        &self,
        active: &[String],
        snapshot: Arc<S>,
    ) -> Result<Vec<(S::Update, Next)>, AgentError> {
        let mut tasks = Vec::with_capacity(active.len());
        for id in active {
            let node = self
                .nodes
                .get(id)
                .cloned()
                .ok_or_else(|| AgentError::ExecutionFailed(format!("unknown node: {}", id)))?;
            tasks.push((id.clone(), node));
        }

        if let [(id, node)] = tasks.as_slice() {
            let output =
                run_node(id.clone(), node.clone(), self.middleware.clone(), snapshot).await?;
            return Ok(vec![output]);
        }

        let handles = tasks.into_iter().map(|(id, node)| {
            tokio::spawn(run_node(
                id,
                node,
                self.middleware.clone(),
                Arc::clone(&snapshot),
            ))
        });
        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.map_err(|e| AgentError::ExecutionFailed(format!("node task failed: {}", e)))?
            })
            .collect()
    }

    /// Successors of `node_id` after it completed with `Next::Continue`.
    fn successors(
        &self,
        node_id: &str,
        state: &S,
        join_progress: &mut [HashSet<String>],
    ) -> Result<Vec<String>, AgentError> {
        let mut targets = match self.routers.get(node_id) {
            Some(cond) => {
                let key = (cond.router)(state);
                let target = cond.path_map.get(&key).ok_or_else(|| {
                    AgentError::ExecutionFailed(format!(
                        "router for {} returned unmapped key {}",
                        node_id, key
                    ))
                })?;
                vec![target.clone()]
            }
            None => self.edges.get(node_id).cloned().unwrap_or_default(),
        };

        for (join, done) in self.joins.iter().zip(join_progress.iter_mut()) {
            if join.sources.iter().any(|s| s == node_id) {
                done.insert(node_id.to_string());
                if done.len() == join.sources.len() {
                    done.clear();
                    targets.push(join.target.clone());
                }
            }
        }
        Ok(targets)
    }

    /// Shared run loop used by invoke() and stream().
    async fn run_loop(
        &self,
        state: &mut S,
        config: &Option<RunnableConfig>,
        sink: Option<&EventSink<S>>,
    ) -> Result<usize, AgentError> {
        log_graph_start(&self.entry);
        let mut active = vec![self.entry.clone()];
        let mut join_progress = vec![HashSet::new(); self.joins.len()];
        let mut steps = 0usize;

        while !active.is_empty() {
            if steps >= self.recursion_limit {
                return Err(AgentError::RecursionLimit(self.recursion_limit));
            }
            steps += 1;
            log_superstep(steps, &active);

            let snapshot = Arc::new(state.clone());
            let outputs = self.run_superstep(&active, snapshot).await?;

            let mut nexts = Vec::with_capacity(outputs.len());
            for (node_id, (update, next)) in active.iter().zip(outputs) {
                state.apply(update);
                if let Some(sink) = sink {
                    sink.emit(node_id, state).await;
                }
                nexts.push(next);
            }

            let mut scheduled: Vec<String> = Vec::new();
            for (node_id, next) in active.iter().zip(nexts) {
                let targets = match next {
                    Next::End => Vec::new(),
                    Next::Node(id) => vec![id],
                    Next::Continue => self.successors(node_id, state, &mut join_progress)?,
                };
                for target in targets {
                    if target != END && !scheduled.contains(&target) {
                        scheduled.push(target);
                    }
                }
            }
            active = scheduled;
        }

        if let (Some(cp), Some(cfg)) = (&self.checkpointer, config) {
            if cfg.thread_id.is_some() {
                let checkpoint =
                    Checkpoint::from_state(state.clone(), CheckpointSource::Update, steps as u64);
                cp.put(cfg, &checkpoint).await?;
            }
        }
        log_graph_complete(steps);
        Ok(steps)
    }

    /// Runs the graph to completion and returns the final state.
    ///
    /// When `config` has `thread_id` and the graph was compiled with a checkpointer,
    /// the final state is saved after the run. Fails with
    /// `AgentError::RecursionLimit` when more supersteps than the limit are needed.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        let mut state = state;
        match self.run_loop(&mut state, &config, None).await {
            Ok(_) => Ok(state),
            Err(e) => {
                log_graph_error(&e);
                Err(e)
            }
        }
    }

    /// Streams graph execution, emitting events via channel-backed Stream.
    ///
    /// A failed run ends with a single `StreamEvent::Error`.
    pub fn stream(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let sink = EventSink {
            tx,
            modes: stream_mode.into(),
        };

        tokio::spawn(async move {
            let mut state = state;
            if let Err(e) = graph.run_loop(&mut state, &config, Some(&sink)).await {
                log_graph_error(&e);
                let _ = sink.tx.send(StreamEvent::Error(Arc::new(e))).await;
            }
        });

        ReceiverStream::new(rx)
    }

    /// Superstep limit this graph was compiled with.
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }
}
