//! Child-list and node-pair reconciliation.

use crate::callbacks::MorphCallbacks;
use crate::config::{HeadStyle, MorphConfig};
use crate::error::MorphError;
use crate::id_map::IdMap;
use html::{Document, NodeId};

/// Counters for everything the pass changed in the old tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MorphStats {
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub nodes_moved: usize,
    pub nodes_morphed: usize,
    pub attributes_changed: usize,
}

impl MorphStats {
    /// Whether the pass left the old tree exactly as it was.
    pub fn is_noop(&self) -> bool {
        self.nodes_added == 0
            && self.nodes_removed == 0
            && self.nodes_moved == 0
            && self.attributes_changed == 0
    }
}

/// State for one reconciliation call. Dropped when the call returns.
pub(crate) struct Morpher<'a> {
    pub(crate) doc: &'a mut Document,
    pub(crate) config: &'a MorphConfig,
    pub(crate) callbacks: &'a mut dyn MorphCallbacks,
    pub(crate) ids: IdMap,
    pub(crate) pending_loads: Vec<NodeId>,
    pub(crate) stats: MorphStats,
}

impl<'a> Morpher<'a> {
    pub(crate) fn new(
        doc: &'a mut Document,
        old: NodeId,
        content: NodeId,
        config: &'a MorphConfig,
        callbacks: &'a mut dyn MorphCallbacks,
    ) -> Self {
        let ids = IdMap::build(doc, old, content);
        Self {
            doc,
            config,
            callbacks,
            ids,
            pending_loads: Vec::new(),
            stats: MorphStats::default(),
        }
    }

    pub(crate) fn is_active(&self, node: NodeId) -> bool {
        self.doc.active_element() == Some(node)
    }

    /// The focused element keeps its value and children when `ignore_active_value` is set.
    pub(crate) fn ignore_value_of_active(&self, node: NodeId) -> bool {
        self.config.ignore_active_value && self.is_active(node)
    }

    /// Same node kind and tag name.
    pub(crate) fn is_soft_match(&self, a: Option<NodeId>, b: Option<NodeId>) -> bool {
        let (Some(a), Some(b)) = (a, b) else {
            return false;
        };
        self.doc.kind(a) == self.doc.kind(b) && self.doc.tag_name(a) == self.doc.tag_name(b)
    }

    fn same_id(&self, a: NodeId, b: NodeId) -> bool {
        matches!(
            (self.doc.element_id(a), self.doc.element_id(b)),
            (Some(x), Some(y)) if x == y
        )
    }

    /// Soft match that is also backed by identity: equal ids or shared live ids beneath.
    pub(crate) fn is_id_set_match(&self, new: NodeId, old: NodeId) -> bool {
        self.is_soft_match(Some(new), Some(old))
            && (self.same_id(new, old) || self.ids.score(new, old) > 0)
    }

    // ---- structural helpers ---------------------------------------------------------------

    fn remove_node(&mut self, node: NodeId) -> Result<(), MorphError> {
        self.ids.mark_dead(self.doc, node);
        if !self.callbacks.before_node_removed(self.doc, node) {
            return Ok(());
        }
        self.doc.remove(node)?;
        self.stats.nodes_removed += 1;
        self.callbacks.after_node_removed(self.doc, node);
        Ok(())
    }

    /// Removes `start` and its following siblings up to (not including) `end`.
    fn remove_nodes_between(&mut self, start: NodeId, end: NodeId) -> Result<Option<NodeId>, MorphError> {
        let mut cursor = Some(start);
        while let Some(node) = cursor
            && node != end
        {
            cursor = self.doc.next_sibling(node);
            self.remove_node(node)?;
        }
        self.ids.mark_dead(self.doc, end);
        Ok(self.doc.next_sibling(end))
    }

    // ---- matching -------------------------------------------------------------------------

    /// Looks ahead in the old siblings for a node `new` can claim by identity.
    ///
    /// Equal ids are claimed wherever they sit. Shared-id matches stop being considered once
    /// the old siblings stepped over carry more identity than `new` itself.
    fn find_id_set_match(
        &self,
        new_parent: NodeId,
        old_parent: NodeId,
        new: NodeId,
        insertion_point: NodeId,
    ) -> Option<NodeId> {
        let new_score = self.ids.score(new, old_parent);
        if new_score == 0 {
            return None;
        }
        let mut competing = 0;
        let mut cursor = Some(insertion_point);
        while let Some(old) = cursor {
            if self.is_id_set_match(new, old) && (competing <= new_score || self.same_id(new, old))
            {
                return Some(old);
            }
            competing += self.ids.score(old, new_parent);
            cursor = self.doc.next_sibling(old);
        }
        None
    }

    /// Looks ahead for a same-tag node carrying no identity the new content could still use.
    fn find_soft_match(
        &self,
        new_parent: NodeId,
        new: NodeId,
        insertion_point: NodeId,
    ) -> Option<NodeId> {
        let mut next_new = self.doc.next_sibling(new);
        let mut sibling_matches = 0;
        let mut cursor = Some(insertion_point);
        while let Some(old) = cursor {
            if self.ids.score(old, new_parent) > 0 {
                return None;
            }
            if self.is_soft_match(Some(new), Some(old)) {
                return Some(old);
            }
            // Two upcoming new siblings would use this node; leave it for them.
            if self.is_soft_match(next_new, Some(old)) {
                sibling_matches += 1;
                next_new = next_new.and_then(|n| self.doc.next_sibling(n));
                if sibling_matches >= 2 {
                    return None;
                }
            }
            cursor = self.doc.next_sibling(old);
        }
        None
    }

    /// Picks the new node that best fits `old`: same tag, most shared ids.
    pub(crate) fn find_best_match(&self, content: NodeId, old: NodeId) -> Option<NodeId> {
        let mut best = self.doc.first_child(content);
        let mut best_score = 0.0;
        for &candidate in self.doc.children(content) {
            if !self.is_soft_match(Some(candidate), Some(old)) {
                continue;
            }
            let score = 0.5 + self.ids.score(candidate, old) as f64;
            if score > best_score {
                best = Some(candidate);
                best_score = score;
            }
        }
        best
    }

    // ---- reconciliation -------------------------------------------------------------------

    /// Reconciles `old` with `new`. Returns the node now standing where `old` stood, if any.
    pub(crate) fn morph_old_node_to(
        &mut self,
        old: NodeId,
        new: Option<NodeId>,
    ) -> Result<Option<NodeId>, MorphError> {
        if self.config.ignore_active && self.is_active(old) {
            return Ok(Some(old));
        }
        let Some(new) = new else {
            if !self.callbacks.before_node_removed(self.doc, old) {
                return Ok(Some(old));
            }
            self.ids.mark_dead(self.doc, old);
            self.doc.remove(old)?;
            self.stats.nodes_removed += 1;
            self.callbacks.after_node_removed(self.doc, old);
            return Ok(None);
        };
        if !self.is_soft_match(Some(old), Some(new)) {
            if !self.callbacks.before_node_removed(self.doc, old)
                || !self.callbacks.before_node_added(self.doc, new)
            {
                return Ok(Some(old));
            }
            self.ids.mark_dead(self.doc, old);
            self.doc.replace_child(new, old)?;
            self.stats.nodes_added += 1;
            self.stats.nodes_removed += 1;
            self.callbacks.after_node_added(self.doc, new);
            self.callbacks.after_node_removed(self.doc, old);
            return Ok(Some(new));
        }
        if !self.callbacks.before_node_morphed(self.doc, old, new) {
            return Ok(Some(old));
        }
        if self.doc.is_tag(old, "head") && self.config.head.style != HeadStyle::Morph {
            self.merge_head(new, old)?;
        } else {
            self.sync_node_from(new, old)?;
            if !self.ignore_value_of_active(old) {
                self.morph_children(new, old)?;
            }
        }
        self.stats.nodes_morphed += 1;
        self.callbacks.after_node_morphed(self.doc, old, new);
        Ok(Some(old))
    }

    /// Rewrites the children of `old_parent` to mirror the children of `new_parent`.
    ///
    /// New children are moved out of `new_parent` as they are inserted.
    pub(crate) fn morph_children(
        &mut self,
        new_parent: NodeId,
        old_parent: NodeId,
    ) -> Result<(), MorphError> {
        let mut next_new = self.doc.first_child(new_parent);
        let mut insertion_point = self.doc.first_child(old_parent);

        while let Some(new) = next_new {
            next_new = self.doc.next_sibling(new);

            let Some(point) = insertion_point else {
                if !self.callbacks.before_node_added(self.doc, new) {
                    return Ok(());
                }
                self.doc.append_child(old_parent, new)?;
                self.stats.nodes_added += 1;
                self.callbacks.after_node_added(self.doc, new);
                self.ids.mark_dead(self.doc, new);
                continue;
            };

            if self.is_id_set_match(new, point) {
                self.morph_old_node_to(point, Some(new))?;
                insertion_point = self.doc.next_sibling(point);
                self.ids.mark_dead(self.doc, new);
                continue;
            }

            if let Some(found) = self.find_id_set_match(new_parent, old_parent, new, point) {
                // Pull the identified node forward instead of discarding what lies between.
                self.doc.insert_before(old_parent, found, Some(point))?;
                self.stats.nodes_moved += 1;
                self.morph_old_node_to(found, Some(new))?;
                self.ids.mark_dead(self.doc, new);
                continue;
            }

            if let Some(found) = self.find_soft_match(new_parent, new, point) {
                insertion_point = self.remove_nodes_between(point, found)?;
                self.morph_old_node_to(found, Some(new))?;
                self.ids.mark_dead(self.doc, new);
                continue;
            }

            if !self.callbacks.before_node_added(self.doc, new) {
                return Ok(());
            }
            self.doc.insert_before(old_parent, new, Some(point))?;
            self.stats.nodes_added += 1;
            self.callbacks.after_node_added(self.doc, new);
            self.ids.mark_dead(self.doc, new);
        }

        while let Some(leftover) = insertion_point {
            insertion_point = self.doc.next_sibling(leftover);
            self.remove_node(leftover)?;
        }
        Ok(())
    }
}
