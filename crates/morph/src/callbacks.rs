use html::{Document, NodeId};

/// What attribute sync is about to do with one attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeUpdate {
    Update,
    Remove,
}

/// Outcome of reconciling a `<head>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadMergeReport {
    pub added: Vec<NodeId>,
    pub kept: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

/// Hooks around every structural and attribute change the reconciler makes.
///
/// `before_*` hooks veto the change by returning `false`. All methods default to no-ops.
pub trait MorphCallbacks {
    fn before_node_added(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn after_node_added(&mut self, _doc: &Document, _node: NodeId) {}

    fn before_node_morphed(&mut self, _doc: &Document, _old: NodeId, _new: NodeId) -> bool {
        true
    }

    /// `old` now carries the state of `new`; `new` is left behind in the response tree.
    fn after_node_morphed(&mut self, _doc: &Document, _old: NodeId, _new: NodeId) {}

    fn before_node_removed(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn after_node_removed(&mut self, _doc: &Document, _node: NodeId) {}

    fn before_attribute_updated(
        &mut self,
        _doc: &Document,
        _node: NodeId,
        _name: &str,
        _update: AttributeUpdate,
    ) -> bool {
        true
    }

    /// Vetoes removal of an old head child that the new head no longer has.
    fn should_remove_head_child(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn after_head_morphed(&mut self, _doc: &Document, _head: NodeId, _report: &HeadMergeReport) {}
}

/// Callbacks that accept everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCallbacks;

impl MorphCallbacks for NoCallbacks {}
