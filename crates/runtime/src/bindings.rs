//! Listener table: which bindings react to which event on which node.

use core_types::{BindingId, ListenerId, WatchId};
use grammar::{ActionSpec, SwapSpec, TriggerSpec};
use html::NodeId;
use std::collections::HashMap;

/// What a binding does when it fires. Named actions and expressions stay unresolved until
/// then.
#[derive(Clone, Debug)]
pub(crate) enum Handler {
    Swap(SwapSpec),
    Action(ActionSpec),
}

impl Handler {
    pub(crate) fn triggers(&self) -> &[TriggerSpec] {
        match self {
            Handler::Swap(spec) => &spec.triggers,
            Handler::Action(spec) => &spec.triggers,
        }
    }

    fn triggers_mut(&mut self) -> &mut [TriggerSpec] {
        match self {
            Handler::Swap(spec) => &mut spec.triggers,
            Handler::Action(spec) => &mut spec.triggers,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Binding {
    pub node: NodeId,
    pub attr: &'static str,
    /// Attribute value the binding was parsed from.
    pub value: String,
    pub handler: Handler,
    pub listeners: Vec<ListenerId>,
    pub watch: WatchId,
}

#[derive(Clone, Debug)]
struct Listener {
    node: NodeId,
    event: String,
    binding: BindingId,
}

#[derive(Debug, Default)]
pub(crate) struct Bindings {
    next_id: u64,
    bindings: HashMap<BindingId, Binding>,
    listeners: HashMap<ListenerId, Listener>,
    by_node: HashMap<NodeId, Vec<ListenerId>>,
    owners: HashMap<NodeId, Vec<BindingId>>,
}

impl Bindings {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Adds a binding with one listener per trigger.
    pub(crate) fn insert(
        &mut self,
        node: NodeId,
        attr: &'static str,
        value: &str,
        handler: Handler,
        watch: WatchId,
    ) -> BindingId {
        let id = self.next();
        let mut listeners = Vec::new();
        for trigger in handler.triggers() {
            let listener = self.next();
            self.listeners.insert(
                listener,
                Listener {
                    node,
                    event: trigger.event.clone(),
                    binding: id,
                },
            );
            self.by_node.entry(node).or_default().push(listener);
            listeners.push(listener);
        }
        self.owners.entry(node).or_default().push(id);
        self.bindings.insert(
            id,
            Binding {
                node,
                attr,
                value: value.to_string(),
                handler,
                listeners,
                watch,
            },
        );
        id
    }

    /// Drops a binding and all of its listeners.
    pub(crate) fn remove(&mut self, id: BindingId) -> Option<Binding> {
        let binding = self.bindings.remove(&id)?;
        for listener in &binding.listeners {
            self.listeners.remove(listener);
        }
        detach_from(&mut self.by_node, binding.node, |l| {
            !binding.listeners.contains(l)
        });
        detach_from(&mut self.owners, binding.node, |b| *b != id);
        Some(binding)
    }

    pub(crate) fn set_watch(&mut self, id: BindingId, watch: WatchId) {
        if let Some(binding) = self.bindings.get_mut(&id) {
            binding.watch = watch;
        }
    }

    pub(crate) fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    pub(crate) fn find(&self, node: NodeId, attr: &str) -> Option<BindingId> {
        self.owners
            .get(&node)?
            .iter()
            .copied()
            .find(|b| self.bindings.get(b).is_some_and(|b| b.attr == attr))
    }

    pub(crate) fn owned_by(&self, node: NodeId) -> Vec<BindingId> {
        self.owners.get(&node).cloned().unwrap_or_default()
    }

    /// Bindings listening for `event` on `node`, in bind order.
    pub(crate) fn listening(&self, node: NodeId, event: &str) -> Vec<BindingId> {
        let Some(listeners) = self.by_node.get(&node) else {
            return Vec::new();
        };
        listeners
            .iter()
            .filter_map(|l| self.listeners.get(l))
            .filter(|l| l.event == event)
            .map(|l| l.binding)
            .collect()
    }

    /// Moves a binding and its listeners to another node.
    pub(crate) fn retarget(&mut self, id: BindingId, node: NodeId) {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return;
        };
        let from = binding.node;
        if from == node {
            return;
        }
        binding.node = node;
        for trigger in binding.handler.triggers_mut() {
            trigger.source = node;
        }
        let moved = binding.listeners.clone();
        for listener in &moved {
            if let Some(l) = self.listeners.get_mut(listener) {
                l.node = node;
            }
        }
        detach_from(&mut self.by_node, from, |l| !moved.contains(l));
        self.by_node.entry(node).or_default().extend(moved);
        detach_from(&mut self.owners, from, |b| *b != id);
        self.owners.entry(node).or_default().push(id);
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

fn detach_from<T>(map: &mut HashMap<NodeId, Vec<T>>, node: NodeId, keep: impl Fn(&T) -> bool) {
    if let Some(list) = map.get_mut(&node) {
        list.retain(|x| keep(x));
        if list.is_empty() {
            map.remove(&node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammar::{ActionHandler, ACTION_ATTR, SWAP_ATTR};
    use html::Document;

    fn action_handler(node: NodeId, events: &[&str]) -> Handler {
        Handler::Action(ActionSpec {
            triggers: events
                .iter()
                .map(|e| TriggerSpec {
                    event: e.to_string(),
                    source: node,
                })
                .collect(),
            handler: ActionHandler::Named {
                namespace: None,
                name: "go".into(),
            },
        })
    }

    #[test]
    fn one_listener_per_trigger() {
        let mut doc = Document::new();
        let a = doc.create_element("button");
        let mut table = Bindings::default();
        let id = table.insert(a, ACTION_ATTR, "@click @focus go", action_handler(a, &["click", "focus"]), 1);
        assert_eq!(table.listener_count(), 2);
        assert_eq!(table.listening(a, "click"), vec![id]);
        assert_eq!(table.listening(a, "focus"), vec![id]);
        assert!(table.listening(a, "submit").is_empty());
        assert_eq!(table.find(a, ACTION_ATTR), Some(id));
        assert_eq!(table.find(a, SWAP_ATTR), None);

        table.remove(id).expect("bound");
        assert_eq!(table.listener_count(), 0);
        assert!(table.listening(a, "click").is_empty());
        assert!(table.owned_by(a).is_empty());
    }

    #[test]
    fn retarget_moves_listeners() {
        let mut doc = Document::new();
        let old = doc.create_element("a");
        let new = doc.create_element("a");
        let mut table = Bindings::default();
        let id = table.insert(new, ACTION_ATTR, "go", action_handler(new, &["click"]), 1);
        table.retarget(id, old);
        assert!(table.listening(new, "click").is_empty());
        assert_eq!(table.listening(old, "click"), vec![id]);
        let binding = table.get(id).expect("binding");
        assert_eq!(binding.node, old);
        assert!(binding.handler.triggers().iter().all(|t| t.source == old));
    }
}
