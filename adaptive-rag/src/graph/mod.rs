//! State graph: nodes, edges, fan-out, joins; compile and invoke.
//!
//! Build a [`StateGraph`] over any [`GraphState`], compile it, then `invoke` or
//! `stream` it. Nodes return partial updates that the runtime applies after
//! each superstep; nodes scheduled together run concurrently.

mod compile_error;
mod compiled;
mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod state;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeMiddleware, NodeOutput, NodeRunFn};
pub use state::GraphState;
pub use state_graph::{StateGraph, DEFAULT_RECURSION_LIMIT, END, START};
