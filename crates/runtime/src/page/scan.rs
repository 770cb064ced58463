use super::{Page, Task};
use crate::FiringError;
use crate::bindings::Handler;
use core_types::BindingId;
use grammar::{ACTION_ATTR, SWAP_ATTR, parse_action, parse_swap};
use html::NodeId;
use html::dom_utils::pretty_node_name;
use html::traverse::elements_inclusive;

/// Result of scanning a subtree for bindings.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub bound: usize,
    /// Already bound with the same attribute value.
    pub unchanged: usize,
    /// Attributes that failed to parse. Each one only skips its own element.
    pub errors: Vec<FiringError>,
}

impl Page {
    /// Scans `root` and its descendants for `z-swap` and `z-action` attributes and binds
    /// them. Elements whose binding already matches their attribute are left alone; changed
    /// attributes are rebound and vanished ones unbound.
    pub fn parse(&mut self, root: NodeId) -> ScanReport {
        let nodes: Vec<NodeId> = elements_inclusive(&self.doc, root).collect();
        let mut report = ScanReport::default();
        for node in nodes {
            self.scan_node(node, &mut report);
        }
        log::log!(
            target: "zjax.bind",
            self.config.scan_log_level(),
            "Found {} new binding(s) in {} ({} unchanged, {} failed)",
            report.bound,
            pretty_node_name(&self.doc, root),
            report.unchanged,
            report.errors.len()
        );
        report
    }

    pub(super) fn scan_node(&mut self, node: NodeId, report: &mut ScanReport) {
        for attr in [SWAP_ATTR, ACTION_ATTR] {
            self.scan_attr(node, attr, report);
        }
    }

    fn scan_attr(&mut self, node: NodeId, attr: &'static str, report: &mut ScanReport) {
        let value = self.doc.attr(node, attr).map(str::to_string);
        if let Some(existing) = self.bindings.find(node, attr) {
            let same = self
                .bindings
                .get(existing)
                .is_some_and(|b| Some(b.value.as_str()) == value.as_deref());
            if same {
                report.unchanged += 1;
                return;
            }
            self.unbind(existing);
        }
        let Some(value) = value else {
            return;
        };
        let parsed = if attr == SWAP_ATTR {
            parse_swap(&value, &self.doc, node).map(Handler::Swap)
        } else {
            parse_action(&value, &self.doc, node).map(Handler::Action)
        };
        match parsed {
            Ok(handler) => {
                self.bind(node, attr, &value, handler);
                report.bound += 1;
            }
            Err(e) => {
                let err = FiringError::new(&self.doc, node, e);
                log::error!(target: "zjax.bind", "Unable to parse {attr}: {err}");
                report.errors.push(err);
            }
        }
    }

    fn bind(&mut self, node: NodeId, attr: &'static str, value: &str, handler: Handler) -> BindingId {
        let events: Vec<String> = handler.triggers().iter().map(|t| t.event.clone()).collect();
        let id = self.bindings.insert(node, attr, value, handler, 0);
        let watch = self.observer.watch(&self.doc, node, id);
        self.bindings.set_watch(id, watch);
        log::log!(
            target: "zjax.bind",
            self.config.scan_log_level(),
            "Added {attr} for '{}' events to {}",
            events.join("', '"),
            pretty_node_name(&self.doc, node)
        );
        if events.iter().any(|e| e == "load") {
            self.ticks.push_back(Task::Load(id));
        }
        id
    }

    pub(super) fn unbind(&mut self, id: BindingId) {
        if let Some(binding) = self.bindings.remove(id) {
            self.observer.unwatch(binding.watch);
            log::trace!(target: "zjax.bind", "unbound {} from {}", binding.attr, binding.node);
        }
    }

    /// After `old` was morphed from `new`, `old` carries `new`'s binding attributes, so it
    /// takes over the bindings made for `new` during the response pre-scan.
    pub(super) fn adopt_bindings(&mut self, old: NodeId, new: NodeId) {
        for attr in [SWAP_ATTR, ACTION_ATTR] {
            let incoming = self.bindings.find(new, attr);
            let existing = self.bindings.find(old, attr);
            let value_of = |id: Option<BindingId>| {
                id.and_then(|id| self.bindings.get(id))
                    .map(|b| b.value.clone())
            };
            let incoming_value = value_of(incoming);
            let existing_value = value_of(existing);
            let current = self.doc.attr(old, attr).map(str::to_string);
            match (incoming, existing) {
                (Some(i), Some(_)) if incoming_value == existing_value => self.unbind(i),
                (Some(i), existing) => {
                    if let Some(e) = existing {
                        self.unbind(e);
                    }
                    self.bindings.retarget(i, old);
                    if let Some(watch) = self.bindings.get(i).map(|b| b.watch) {
                        self.observer.retarget(&self.doc, watch, old);
                    }
                }
                (None, Some(e)) if current != existing_value => self.unbind(e),
                _ => {}
            }
        }
    }
}
