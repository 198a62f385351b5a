//! Where to go after a node runs.

/// Next step after a node completes.
///
/// - `Continue`: follow the node's conditional router or static edges (and joins).
/// - `Node(id)`: jump to `id`, ignoring edges.
/// - `End`: stop this branch. Other branches in the same superstep keep running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Continue,
    Node(String),
    End,
}
