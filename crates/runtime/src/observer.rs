//! Structural watches that tear bindings down once their node leaves the document.
//!
//! Each binding owns exactly one watch. A watch is armed the first time its node is seen
//! connected (response nodes are bound before insertion) and fires once: either a removal
//! batch leaves the node disconnected, or the node was purged. Moves within one batch
//! do not fire.

use core_types::{BindingId, WatchId};
use html::{Document, MutationRecord, NodeId};
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct Watch {
    node: NodeId,
    binding: BindingId,
    armed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Observer {
    next_id: WatchId,
    watches: HashMap<WatchId, Watch>,
}

impl Observer {
    pub(crate) fn watch(&mut self, doc: &Document, node: NodeId, binding: BindingId) -> WatchId {
        self.next_id += 1;
        self.watches.insert(
            self.next_id,
            Watch {
                node,
                binding,
                armed: doc.is_connected(node),
            },
        );
        self.next_id
    }

    pub(crate) fn unwatch(&mut self, id: WatchId) {
        self.watches.remove(&id);
    }

    pub(crate) fn retarget(&mut self, doc: &Document, id: WatchId, node: NodeId) {
        if let Some(watch) = self.watches.get_mut(&id) {
            watch.node = node;
            watch.armed = doc.is_connected(node);
        }
    }

    /// Processes one mutation batch and returns the bindings whose watch fired.
    /// Fired watches are gone afterwards.
    pub(crate) fn observe(&mut self, doc: &Document, batch: &[MutationRecord]) -> Vec<BindingId> {
        let removals = batch.iter().any(|r| !r.removed.is_empty());
        let mut fired = Vec::new();
        self.watches.retain(|id, watch| {
            let gone = if !doc.contains_node(watch.node) {
                true
            } else if doc.is_connected(watch.node) {
                watch.armed = true;
                false
            } else {
                watch.armed && removals
            };
            if gone {
                log::trace!(target: "zjax.observer", "watch {id} fired for {}", watch.node);
                fired.push(watch.binding);
            }
            !gone
        });
        fired.sort_unstable();
        fired
    }

    pub(crate) fn len(&self) -> usize {
        self.watches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::parse_fragment;

    #[test]
    fn fires_once_after_removal() {
        let mut doc = Document::new();
        let root = doc.root();
        let frag = parse_fragment(&mut doc, "<div><p></p></div>");
        doc.move_children(frag, root).expect("attach");
        doc.take_mutations();
        let div = doc.first_child(root).expect("div");
        let p = doc.first_child(div).expect("p");

        let mut observer = Observer::default();
        observer.watch(&doc, p, 7);
        assert!(observer.observe(&doc, &[]).is_empty());

        doc.remove(div).expect("remove");
        let batch = doc.take_mutations();
        assert_eq!(observer.observe(&doc, &batch), vec![7]);
        assert_eq!(observer.len(), 0);
        assert!(observer.observe(&doc, &batch).is_empty());
    }

    #[test]
    fn unattached_nodes_arm_on_insertion() {
        let mut doc = Document::new();
        let root = doc.root();
        let frag = parse_fragment(&mut doc, "<p></p>");
        let p = doc.first_child(frag).expect("p");
        let mut observer = Observer::default();
        observer.watch(&doc, p, 1);

        // A removal elsewhere must not fire a watch that was never connected.
        let other = doc.create_element("i");
        doc.append_child(root, other).expect("append");
        doc.remove(other).expect("remove");
        let batch = doc.take_mutations();
        assert!(observer.observe(&doc, &batch).is_empty());

        doc.append_child(root, p).expect("insert");
        let batch = doc.take_mutations();
        assert!(observer.observe(&doc, &batch).is_empty());

        // Moving within the document is not a removal of the node.
        let wrapper = doc.create_element("div");
        doc.append_child(root, wrapper).expect("wrapper");
        doc.append_child(wrapper, p).expect("move");
        let batch = doc.take_mutations();
        assert!(observer.observe(&doc, &batch).is_empty());
        assert_eq!(observer.len(), 1);
    }

    #[test]
    fn purged_nodes_fire_without_a_batch() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, "<p></p>");
        let p = doc.first_child(frag).expect("p");
        let mut observer = Observer::default();
        observer.watch(&doc, p, 3);
        doc.purge(frag);
        assert_eq!(observer.observe(&doc, &[]), vec![3]);
    }
}
