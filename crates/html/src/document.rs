//! Arena-backed mutable document.
//!
//! Every node (live, detached, or parsed from a response) lives in one arena, so moving a
//! node between a response fragment and the live tree is a re-parent rather than a copy.
//! Node handles are never reused; a purged handle stays invalid forever.
//!
//! Structural mutations under the document root are recorded as [`MutationRecord`]s and
//! handed out in batches via [`Document::take_mutations`].

use crate::types::{Attribute, NodeId, NodeKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} cannot have children")]
    NotAContainer(NodeId),
    #[error("inserting {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("the document root cannot be moved or removed")]
    RootImmovable,
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0} has the wrong kind for this operation")]
    WrongNodeKind(NodeId),
}

/// Live form-control state that can diverge from the markup attributes.
/// `None` means "not dirty": the property reflects its attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub selected: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct ElementData {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub form: FormState,
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Document,
    Fragment,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Fragment => NodeKind::Fragment,
            NodeData::Doctype(_) => NodeKind::Doctype,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    fn is_container(&self) -> bool {
        matches!(
            self,
            NodeData::Document | NodeData::Fragment | NodeData::Element(_)
        )
    }
}

#[derive(Debug)]
struct NodeRecord {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// One structural change under a connected parent, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub parent: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<NodeRecord>>,
    root: NodeId,
    focused: Option<NodeId>,
    mutations: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(1),
            focused: None,
            mutations: Vec::new(),
        };
        doc.root = doc.alloc(NodeData::Document);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Some(NodeRecord {
            parent: None,
            children: Vec::new(),
            data,
        }));
        NodeId(self.nodes.len() as u32)
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn record_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord, DomError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(DomError::UnknownNode(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.record(id).is_some()
    }

    // ---- creation -------------------------------------------------------------------------

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_element_with(name, Vec::new())
    }

    pub fn create_element_with(&mut self, name: &str, attributes: Vec<Attribute>) -> NodeId {
        self.alloc(NodeData::Element(ElementData {
            name: name.to_ascii_lowercase(),
            attributes,
            form: FormState::default(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Comment(text.to_string()))
    }

    pub fn create_doctype(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Doctype(text.to_string()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    // ---- inspection -----------------------------------------------------------------------

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.record(id).map(|r| &r.data)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.data(id).map(NodeData::kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id)? {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.record_mut(id)?.data {
            NodeData::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Lowercase tag name for elements.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id).is_some_and(|n| n.eq_ignore_ascii_case(tag))
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id)
            .map(|el| el.attributes.as_slice())
            .unwrap_or(&[])
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// The element's `id` attribute when present and non-empty.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "id").filter(|v| !v.is_empty())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// Character data of text and comment nodes.
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(t) | NodeData::Comment(t) | NodeData::Doctype(t) => Some(t),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.record(id)?.parent
    }

    /// The parent if it is an element (DOM `parentElement`).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.record(id)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    fn position_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let pos = self.children(parent).iter().position(|c| *c == id)?;
        Some((parent, pos))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position_in_parent(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position_in_parent(id)?;
        pos.checked_sub(1)
            .and_then(|p| self.children(parent).get(p).copied())
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains_node(id) && self.contains(self.root, id)
    }

    /// Topmost ancestor (the node itself when detached without a parent).
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// First `html`, then `head`/`body` child lookups mirror `document.documentElement`.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root).find(|c| self.is_tag(*c, "html"))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_descendant(self.root, |doc, id| doc.is_tag(id, "body"))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.find_descendant(self.root, |doc, id| doc.is_tag(id, "head"))
    }

    /// Preorder search of `root`'s descendants (excluding `root`).
    pub fn find_descendant(
        &self,
        root: NodeId,
        pred: impl Fn(&Document, NodeId) -> bool,
    ) -> Option<NodeId> {
        crate::traverse::descendants(self, root).find(|id| pred(self, *id))
    }

    /// First element with the given `id` attribute under `root`, including `root`.
    pub fn element_by_id(&self, root: NodeId, element_id: &str) -> Option<NodeId> {
        if self.element_id(root) == Some(element_id) {
            return Some(root);
        }
        self.find_descendant(root, |doc, id| doc.element_id(id) == Some(element_id))
    }

    // ---- attributes -----------------------------------------------------------------------

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        match el
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => {
                if existing.value != value {
                    existing.value = value.to_string();
                }
            }
            None => el
                .attributes
                .push(Attribute::new(name.to_ascii_lowercase(), value)),
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        let el = self.element_mut(id)?;
        let before = el.attributes.len();
        el.attributes.retain(|a| !a.name.eq_ignore_ascii_case(name));
        Ok(el.attributes.len() != before)
    }

    /// Replace all attributes at once.
    pub fn replace_attributes(
        &mut self,
        id: NodeId,
        attributes: Vec<Attribute>,
    ) -> Result<(), DomError> {
        self.element_mut(id)?.attributes = attributes;
        Ok(())
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let mut value = self.attr(id, "class").unwrap_or_default().trim().to_string();
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(class);
        self.set_attr(id, "class", &value)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let Some(current) = self.attr(id, "class") else {
            return Ok(());
        };
        let value = current
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &value)
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> Result<bool, DomError> {
        if self.has_class(id, class) {
            self.remove_class(id, class)?;
            Ok(false)
        } else {
            self.add_class(id, class)?;
            Ok(true)
        }
    }

    pub fn set_node_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        match &mut self.record_mut(id)?.data {
            NodeData::Text(t) | NodeData::Comment(t) => {
                if t != value {
                    *t = value.to_string();
                }
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind(id)),
        }
    }

    // ---- form properties ------------------------------------------------------------------

    pub fn form_state(&self, id: NodeId) -> Option<&FormState> {
        self.element(id).map(|el| &el.form)
    }

    /// The `value` property: dirty value, else the markup default.
    pub fn value(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        if let Some(v) = &el.form.value {
            return v.clone();
        }
        match el.name.as_str() {
            "textarea" => self.text_content(id),
            "select" => crate::form::selected_options(self, id)
                .first()
                .map(|o| crate::form::option_value(self, *o))
                .unwrap_or_default(),
            "option" => crate::form::option_value(self, id),
            _ => self.attr(id, "value").unwrap_or_default().to_string(),
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.form.value = Some(value.to_string());
        Ok(())
    }

    pub fn checked(&self, id: NodeId) -> bool {
        match self.element(id) {
            Some(el) => el
                .form
                .checked
                .unwrap_or_else(|| self.has_attr(id, "checked")),
            None => false,
        }
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), DomError> {
        self.element_mut(id)?.form.checked = Some(checked);
        Ok(())
    }

    pub fn selected(&self, id: NodeId) -> bool {
        match self.element(id) {
            Some(el) => el
                .form
                .selected
                .unwrap_or_else(|| self.has_attr(id, "selected")),
            None => false,
        }
    }

    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<(), DomError> {
        self.element_mut(id)?.form.selected = Some(selected);
        Ok(())
    }

    // ---- focus ----------------------------------------------------------------------------

    /// The focused element, if it is still connected.
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused.filter(|id| self.is_connected(*id))
    }

    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.is_element(id) && self.is_connected(id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    // ---- structure ------------------------------------------------------------------------

    fn ensure_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_rec = self.record(parent).ok_or(DomError::UnknownNode(parent))?;
        if !parent_rec.data.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        if self.record(child).is_none() {
            return Err(DomError::UnknownNode(child));
        }
        if child == self.root {
            return Err(DomError::RootImmovable);
        }
        if self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    fn push_mutation(&mut self, parent: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if !self.is_connected(parent) {
            return;
        }
        self.mutations.push(MutationRecord {
            parent,
            added,
            removed,
        });
    }

    /// Unlinks `child` from its parent, if any.
    fn detach(&mut self, child: NodeId) -> Result<(), DomError> {
        let Some((parent, pos)) = self.position_in_parent(child) else {
            return Ok(());
        };
        self.record_mut(parent)?.children.remove(pos);
        self.record_mut(child)?.parent = None;
        self.push_mutation(parent, Vec::new(), vec![child]);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` before `reference` (or at the end). Moves `child` if already attached.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if reference == Some(child) {
            return Ok(());
        }
        self.ensure_insertable(parent, child)?;
        if let Some(reference) = reference
            && self.parent(reference) != Some(parent)
        {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.detach(child)?;
        let index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .ok_or(DomError::NotAChild {
                    parent,
                    child: reference,
                })?,
            None => self.children(parent).len(),
        };
        self.record_mut(parent)?.children.insert(index, child);
        self.record_mut(child)?.parent = Some(parent);
        self.push_mutation(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Detaches `child` from its parent. The subtree stays allocated until purged.
    pub fn remove(&mut self, child: NodeId) -> Result<(), DomError> {
        if child == self.root {
            return Err(DomError::RootImmovable);
        }
        if !self.contains_node(child) {
            return Err(DomError::UnknownNode(child));
        }
        self.detach(child)
    }

    /// Puts `new` where `old` was. `old` ends up detached.
    pub fn replace_child(&mut self, new: NodeId, old: NodeId) -> Result<(), DomError> {
        let parent = self.parent(old).ok_or(DomError::NotAChild {
            parent: self.root,
            child: old,
        })?;
        if new == old {
            return Ok(());
        }
        self.insert_before(parent, new, Some(old))?;
        self.remove(old)
    }

    /// Removes every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = self.children(id).to_vec();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Moves all children of `from` to the end of `to`, preserving order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), DomError> {
        let children = self.children(from).to_vec();
        for child in children {
            self.append_child(to, child)?;
        }
        Ok(())
    }

    /// Frees a detached subtree. Connected nodes are left alone.
    pub fn purge(&mut self, id: NodeId) -> usize {
        if id == self.root || self.parent(id).is_some() || !self.contains_node(id) {
            return 0;
        }
        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(current.index())
                && let Some(record) = slot.take()
            {
                stack.extend(record.children);
                freed += 1;
            }
        }
        if self.focused.is_some_and(|f| !self.contains_node(f)) {
            self.focused = None;
        }
        freed
    }

    /// Drains the structural mutations recorded since the previous call.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    pub fn has_pending_mutations(&self) -> bool {
        !self.mutations.is_empty()
    }

    /// Number of allocated (not yet purged) nodes.
    pub fn live_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    // ---- text ------------------------------------------------------------------------------

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeData::Text(t)) = self.data(id) {
            return t.clone();
        }
        for node in crate::traverse::descendants(self, id) {
            if let Some(NodeData::Text(t)) = self.data(node) {
                out.push_str(t);
            }
        }
        out
    }

    /// Replaces all children with a single text node (or nothing for an empty string).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.clear_children(id)?;
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div_with_children(doc: &mut Document, n: usize) -> (NodeId, Vec<NodeId>) {
        let div = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, div).expect("append div");
        let mut children = Vec::new();
        for i in 0..n {
            let p = doc.create_element_with("p", vec![Attribute::new("id", format!("p{i}"))]);
            doc.append_child(div, p).expect("append p");
            children.push(p);
        }
        (div, children)
    }

    #[test]
    fn insert_before_moves_existing_child() {
        let mut doc = Document::new();
        let (div, kids) = div_with_children(&mut doc, 3);
        doc.insert_before(div, kids[2], Some(kids[0])).expect("move");
        assert_eq!(doc.children(div), &[kids[2], kids[0], kids[1]]);
        assert_eq!(doc.parent(kids[2]), Some(div));
    }

    #[test]
    fn insert_before_rejects_cycles() {
        let mut doc = Document::new();
        let (div, kids) = div_with_children(&mut doc, 1);
        let err = doc.append_child(kids[0], div).expect_err("cycle");
        assert!(
            matches!(err, DomError::CycleDetected { .. }),
            "expected cycle error, got: {err:?}"
        );
    }

    #[test]
    fn mutations_only_recorded_for_connected_parents() {
        let mut doc = Document::new();
        let (div, kids) = div_with_children(&mut doc, 2);
        doc.take_mutations();

        let frag = doc.create_fragment();
        let loose = doc.create_element("span");
        doc.append_child(frag, loose).expect("append to fragment");
        assert!(doc.take_mutations().is_empty());

        doc.remove(kids[1]).expect("remove");
        let batch = doc.take_mutations();
        assert_eq!(
            batch,
            vec![MutationRecord {
                parent: div,
                added: vec![],
                removed: vec![kids[1]]
            }]
        );
    }

    #[test]
    fn moving_connected_node_records_removal_then_addition() {
        let mut doc = Document::new();
        let (div, kids) = div_with_children(&mut doc, 2);
        doc.take_mutations();
        doc.append_child(kids[1], kids[0]).expect("nest");
        let batch = doc.take_mutations();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].parent, div);
        assert_eq!(batch[0].removed, vec![kids[0]]);
        assert_eq!(batch[1].parent, kids[1]);
        assert_eq!(batch[1].added, vec![kids[0]]);
        assert!(doc.is_connected(kids[0]));
    }

    #[test]
    fn focus_is_dropped_once_node_disconnects() {
        let mut doc = Document::new();
        let (_, kids) = div_with_children(&mut doc, 1);
        assert!(doc.focus(kids[0]));
        assert_eq!(doc.active_element(), Some(kids[0]));
        doc.remove(kids[0]).expect("remove");
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn purge_frees_only_detached_subtrees() {
        let mut doc = Document::new();
        let (div, kids) = div_with_children(&mut doc, 2);
        assert_eq!(doc.purge(div), 0);
        doc.remove(div).expect("remove");
        assert_eq!(doc.purge(div), 3);
        assert!(!doc.contains_node(kids[0]));
        let next = doc.create_element("p");
        assert!(next > kids[1], "handles must never be reused");
    }

    #[test]
    fn class_helpers_keep_other_classes() {
        let mut doc = Document::new();
        let el = doc.create_element_with("div", vec![Attribute::new("class", "a b")]);
        doc.add_class(el, "c").expect("add");
        assert_eq!(doc.attr(el, "class"), Some("a b c"));
        assert!(!doc.toggle_class(el, "b").expect("toggle"));
        assert_eq!(doc.attr(el, "class"), Some("a c"));
    }

    #[test]
    fn value_property_falls_back_to_markup() {
        let mut doc = Document::new();
        let input = doc.create_element_with("input", vec![Attribute::new("value", "x")]);
        assert_eq!(doc.value(input), "x");
        doc.set_value(input, "typed").expect("set value");
        assert_eq!(doc.value(input), "typed");
        assert_eq!(doc.attr(input, "value"), Some("x"));
    }
}
