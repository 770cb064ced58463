use html::{Document, NodeId};

/// Host hooks for visually batched swaps.
///
/// A host that can animate snapshots the old state in `start` and animates to the new one in
/// `finish`. The tree mutation between the two calls is the same whether or not a transition
/// runs.
pub trait ViewTransitions {
    /// Returns `false` when no transition will run for this swap.
    fn start(&mut self, doc: &Document, target: NodeId) -> bool;

    fn finish(&mut self, doc: &Document, nodes: &[NodeId]);
}

/// Applies every swap synchronously.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTransitions;

impl ViewTransitions for NoTransitions {
    fn start(&mut self, _doc: &Document, _target: NodeId) -> bool {
        false
    }

    fn finish(&mut self, _doc: &Document, _nodes: &[NodeId]) {}
}
