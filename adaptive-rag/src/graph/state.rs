//! Graph state contract: a state type plus the partial update its nodes return.

use std::fmt::Debug;

/// State flowing through a graph.
///
/// Nodes never mutate the state directly: each node returns an `Update` and the
/// runtime folds it in with [`GraphState::apply`] after the superstep, in
/// schedule order. Nodes that run in the same superstep should write disjoint
/// fields.
pub trait GraphState: Clone + Send + Sync + Debug + 'static {
    /// Partial update returned by a node.
    type Update: Send + 'static;

    /// Merges `update` into `self`. Must be pure: no I/O, no failure.
    fn apply(&mut self, update: Self::Update);
}

/// Integer state for small graphs and tests: updates are added.
impl GraphState for i32 {
    type Update = i32;

    fn apply(&mut self, update: i32) {
        *self += update;
    }
}
