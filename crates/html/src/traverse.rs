use crate::{Document, NodeId};

/// Preorder walk over the descendants of `root` (excluding `root`).
///
/// The walk snapshots each child list as it descends, so callers that only read are safe;
/// mutate after collecting.
pub fn descendants(doc: &Document, root: NodeId) -> Descendants<'_> {
    let mut stack: Vec<NodeId> = doc.children(root).to_vec();
    stack.reverse();
    Descendants { doc, stack }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Preorder element walk including `root` itself when it is an element.
pub fn elements_inclusive(doc: &Document, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::once(root)
        .chain(descendants(doc, root))
        .filter(|id| doc.is_element(*id))
}

/// Ancestors of `id`, nearest first, excluding `id`.
pub fn ancestors(doc: &Document, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(doc.parent(id), |n| doc.parent(*n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_fragment;

    #[test]
    fn descendants_are_preorder() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, "<a><b></b><c><d></d></c></a><e></e>");
        let names: Vec<&str> = descendants(&doc, frag)
            .filter_map(|id| doc.tag_name(id))
            .collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn ancestors_walk_to_tree_root() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, "<a><b><c></c></b></a>");
        let c = doc
            .find_descendant(frag, |d, id| d.is_tag(id, "c"))
            .expect("c element");
        let chain: Vec<NodeId> = ancestors(&doc, c).collect();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.last().copied(), Some(frag));
    }
}
