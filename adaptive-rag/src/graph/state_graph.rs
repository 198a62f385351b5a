//! State graph: nodes + edges (static, conditional, fan-out, joins).
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using `START`
//! and `END` for entry/exit, branch with `add_conditional_edges`, synchronize
//! parallel branches with `add_join`, then `compile` (or a `compile_with_*`
//! variant) to get a `CompiledStateGraph`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, ConditionalEdges, Join, Router};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;
use crate::graph::GraphState;
use crate::memory::Checkpointer;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)` or as
/// a router target.
pub const END: &str = "__end__";

/// Supersteps a run may take before failing with `AgentError::RecursionLimit`.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// State graph builder.
///
/// Generic over state type `S`. Several `add_edge` calls from the same node fan
/// out: all targets run in the next superstep, concurrently. A join target runs
/// once every one of its sources has completed.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S>
where
    S: GraphState,
{
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<(String, String)>,
    routers: HashMap<String, ConditionalEdges<S>>,
    joins: Vec<Join>,
    recursion_limit: usize,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> Default for StateGraph<S>
where
    S: GraphState,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: GraphState,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            routers: HashMap::new(),
            joins: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            middleware: None,
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id`.
    ///
    /// Use `START` for graph entry and `END` for graph exit. Adding several edges
    /// from one node fans out.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Routes out of `from_id` by calling `router` on the state after the
    /// superstep; its return value is looked up in `path_map` (targets may be `END`).
    ///
    /// A node has either a router or static edges, not both.
    pub fn add_conditional_edges<F>(
        &mut self,
        from_id: impl Into<String>,
        router: F,
        path_map: HashMap<String, String>,
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        let router: Router<S> = Arc::new(router);
        self.routers
            .insert(from_id.into(), ConditionalEdges { router, path_map });
        self
    }

    /// Schedules `target` once every node in `sources` has completed with
    /// `Next::Continue`. Sources may finish in different supersteps.
    pub fn add_join<I, T>(&mut self, sources: I, target: impl Into<String>) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.joins.push(Join {
            sources: sources.into_iter().map(Into::into).collect(),
            target: target.into(),
        });
        self
    }

    /// Overrides the superstep limit (default [`DEFAULT_RECURSION_LIMIT`]).
    pub fn with_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    /// Attaches node middleware; `compile()` keeps it.
    pub fn with_middleware(mut self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        self.middleware = Some(middleware);
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None, None)
    }

    /// Builds the executable graph with a checkpointer. When `invoke(state, config)`
    /// is called with `config.thread_id`, the final state is saved after the run.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer), None)
    }

    /// Builds the executable graph with node middleware wrapping every node run.
    pub fn compile_with_middleware(
        self,
        middleware: Arc<dyn NodeMiddleware<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None, Some(middleware))
    }

    /// Builds the executable graph with both checkpointer and node middleware.
    pub fn compile_with_checkpointer_and_middleware(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
        middleware: Arc<dyn NodeMiddleware<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer), Some(middleware))
    }

    fn require_node(&self, id: &str) -> Result<(), CompilationError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(CompilationError::NodeNotFound(id.to_string()))
        }
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
        middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START {
                self.require_node(from)?;
            }
            if to != END {
                self.require_node(to)?;
            }
        }

        let mut entries = self.edges.iter().filter(|(f, _)| f == START);
        let entry = match (entries.next(), entries.next()) {
            (Some((_, to)), None) if to != END => to.clone(),
            _ => return Err(CompilationError::MissingStart),
        };

        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f != START) {
            let targets = edges.entry(from.clone()).or_default();
            if !targets.contains(to) {
                targets.push(to.clone());
            }
        }

        for (from, cond) in &self.routers {
            self.require_node(from)?;
            if edges.contains_key(from) {
                return Err(CompilationError::InvalidGraph(format!(
                    "node {} has both static and conditional edges",
                    from
                )));
            }
            for target in cond.path_map.values() {
                if target != END {
                    self.require_node(target)?;
                }
            }
        }

        for join in &self.joins {
            let unique: HashSet<_> = join.sources.iter().collect();
            if unique.len() < 2 || unique.len() != join.sources.len() {
                return Err(CompilationError::InvalidGraph(format!(
                    "join into {} needs at least two distinct sources",
                    join.target
                )));
            }
            for source in &join.sources {
                self.require_node(source)?;
            }
            self.require_node(&join.target)?;
        }

        let reaches_end = edges.values().flatten().any(|t| t == END)
            || self
                .routers
                .values()
                .any(|c| c.path_map.values().any(|t| t == END));
        if !reaches_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut seen: HashSet<String> = HashSet::from([entry.clone()]);
        let mut queue = VecDeque::from([entry.clone()]);
        while let Some(id) = queue.pop_front() {
            let static_targets = edges.get(&id).into_iter().flatten();
            let routed = self
                .routers
                .get(&id)
                .into_iter()
                .flat_map(|c| c.path_map.values());
            let joined = self
                .joins
                .iter()
                .filter(|j| j.sources.contains(&id))
                .map(|j| &j.target);
            for next in static_targets.chain(routed).chain(joined) {
                if next != END && seen.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }
        let mut unreachable: Vec<_> = self
            .nodes
            .keys()
            .filter(|id| !seen.contains(*id))
            .collect();
        unreachable.sort();
        if let Some(id) = unreachable.first() {
            return Err(CompilationError::Unreachable((*id).clone()));
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            entry,
            edges,
            routers: self.routers,
            joins: self.joins,
            recursion_limit: self.recursion_limit,
            checkpointer,
            middleware: middleware.or(self.middleware),
        })
    }
}
