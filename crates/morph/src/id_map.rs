use html::traverse::elements_inclusive;
use html::{Document, NodeId};
use std::collections::{HashMap, HashSet};

/// Per-pass map from a node to the ids visible beneath it, plus the ids already consumed.
#[derive(Debug, Default)]
pub(crate) struct IdMap {
    sets: HashMap<NodeId, HashSet<String>>,
    dead: HashSet<String>,
}

impl IdMap {
    /// Indexes both subtrees. Each id is recorded on its element and on ancestors up to the
    /// nearest ancestor that has an id of its own, never past `root`.
    pub(crate) fn build(doc: &Document, old_root: NodeId, new_root: NodeId) -> Self {
        let mut map = IdMap::default();
        map.index(doc, old_root);
        map.index(doc, new_root);
        map
    }

    fn index(&mut self, doc: &Document, root: NodeId) {
        for node in elements_inclusive(doc, root) {
            let Some(id) = doc.element_id(node) else {
                continue;
            };
            let mut current = node;
            loop {
                self.sets
                    .entry(current)
                    .or_default()
                    .insert(id.to_string());
                if current == root {
                    break;
                }
                let Some(parent) = doc.parent(current) else {
                    break;
                };
                current = parent;
                if doc.element_id(current).is_some() {
                    self.sets
                        .entry(current)
                        .or_default()
                        .insert(id.to_string());
                    break;
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn ids(&self, node: NodeId) -> Option<&HashSet<String>> {
        self.sets.get(&node)
    }

    #[cfg(test)]
    pub(crate) fn is_dead(&self, id: &str) -> bool {
        self.dead.contains(id)
    }

    /// Live ids of `a` that are also visible under `b`.
    pub(crate) fn score(&self, a: NodeId, b: NodeId) -> usize {
        let (Some(a_ids), Some(b_ids)) = (self.sets.get(&a), self.sets.get(&b)) else {
            return 0;
        };
        a_ids
            .iter()
            .filter(|id| !self.dead.contains(*id) && b_ids.contains(*id))
            .count()
    }

    /// Retires every id under `node`; they can no longer attract matches this pass.
    pub(crate) fn mark_dead(&mut self, doc: &Document, node: NodeId) {
        for element in elements_inclusive(doc, node) {
            if let Some(id) = doc.element_id(element) {
                self.dead.insert(id.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::parse_fragment;

    fn by_id(doc: &Document, root: NodeId, id: &str) -> NodeId {
        doc.element_by_id(root, id)
            .unwrap_or_else(|| panic!("missing #{id}"))
    }

    #[test]
    fn ids_stop_at_nearest_identified_ancestor() {
        let mut doc = Document::new();
        let root = parse_fragment(
            &mut doc,
            r#"<div class="wrap"><section id="s"><p id="a"></p></section><p id="b"></p></div>"#,
        );
        let empty = doc.create_fragment();
        let map = IdMap::build(&doc, root, empty);
        let wrap = doc.first_child(root).expect("wrap");
        let ids = |n: NodeId| {
            let mut v: Vec<String> = map.ids(n).into_iter().flatten().cloned().collect();
            v.sort();
            v
        };
        assert_eq!(ids(by_id(&doc, root, "s")), ["a", "s"]);
        assert_eq!(ids(wrap), ["b", "s"]);
        assert_eq!(ids(root), ["b", "s"]);
    }

    #[test]
    fn dead_ids_no_longer_score() {
        let mut doc = Document::new();
        let old = parse_fragment(&mut doc, r#"<div><p id="z"></p><p id="y"></p></div>"#);
        let new = parse_fragment(&mut doc, r#"<div><p id="z"></p><p id="y"></p></div>"#);
        let mut map = IdMap::build(&doc, old, new);
        let old_div = doc.first_child(old).expect("old div");
        let new_div = doc.first_child(new).expect("new div");
        assert_eq!(map.score(new_div, old_div), 2);

        map.mark_dead(&doc, by_id(&doc, old, "z"));
        assert!(map.is_dead("z"));
        assert_eq!(map.score(new_div, old_div), 1);
        assert_eq!(map.score(by_id(&doc, new, "z"), old_div), 0);
    }

    #[test]
    fn mark_dead_retires_ids_hidden_under_identified_children() {
        let mut doc = Document::new();
        let old = parse_fragment(
            &mut doc,
            r#"<div><section id="a"><p id="z"></p></section></div>"#,
        );
        let new = parse_fragment(&mut doc, r#"<p id="z"></p>"#);
        let mut map = IdMap::build(&doc, old, new);
        let div = doc.first_child(old).expect("div");
        let section = by_id(&doc, old, "a");
        let new_z = by_id(&doc, new, "z");
        assert!(!map.ids(div).is_some_and(|ids| ids.contains("z")));
        assert_eq!(map.score(new_z, section), 1);

        map.mark_dead(&doc, div);
        assert!(map.is_dead("a"));
        assert!(map.is_dead("z"));
        assert_eq!(map.score(new_z, section), 0);
    }
}
