//! `z-swap` firings: request, response, per-rule swap, settle.

use super::{Page, ScanReport, Task};
use crate::{Error, FiringError};
use bus::{CoreEvent, Signal};
use core_types::{FiringId, HttpMethod};
use grammar::{InsertMode, SwapRule, SwapSelector, SwapSpec};
use html::dom_utils::{external_resource_url, pretty_node_name};
use html::form::form_entries;
use html::serialize::collapsed_markup;
use html::traverse::{descendants, elements_inclusive};
use html::{Attribute, DomError, NodeId, parse_fragment};
use morph::{MorphCallbacks, settle_attributes};
use net::{NetError, Request, Response};

/// A firing waiting on its response.
pub(crate) struct Firing {
    owner: NodeId,
    owner_name: String,
    swaps: Vec<SwapRule>,
}

/// Attribute work held back until the tick after a swap.
pub(crate) struct Settle {
    firing: FiringId,
    owner: NodeId,
    /// Response attributes per element id, in the order the ids were found.
    attributes: Vec<(String, Vec<Attribute>)>,
    /// Nodes the swapped content ended up in; settled ids are looked up beneath them.
    scope: Vec<NodeId>,
    pending_loads: Vec<NodeId>,
    remaining: usize,
    /// `false` once the firing failed: attributes are still restored, but silently.
    emit: bool,
}

impl Settle {
    fn new(firing: FiringId, owner: NodeId) -> Self {
        Self {
            firing,
            owner,
            attributes: Vec::new(),
            scope: Vec::new(),
            pending_loads: Vec::new(),
            remaining: 0,
            emit: true,
        }
    }

    fn has_id(&self, id: &str) -> bool {
        self.attributes.iter().any(|(k, _)| k == id)
    }
}

/// Records which old nodes were morphed from which response nodes.
#[derive(Default)]
struct MorphedPairs(Vec<(NodeId, NodeId)>);

impl MorphCallbacks for MorphedPairs {
    fn after_node_morphed(&mut self, _doc: &html::Document, old: NodeId, new: NodeId) {
        self.0.push((old, new));
    }
}

impl Page {
    pub(super) fn fire_swap(&mut self, owner: NodeId, event: &str, spec: SwapSpec) {
        let firing = self.next_firing();
        let owner_name = pretty_node_name(&self.doc, owner);
        // Form fields are read now, not at bind time.
        let form = self
            .doc
            .is_tag(owner, "form")
            .then(|| form_entries(&self.doc, owner));
        let request = match Request::new(
            spec.request.method,
            &self.base_url,
            &spec.request.endpoint,
            form.as_deref(),
        ) {
            Ok(request) => request,
            Err(e) => return self.fail(Some(firing), owner, owner_name, e.into()),
        };
        log::debug!(
            target: "zjax.swap",
            "z-swap '{event}' on {owner_name}: {} {}",
            request.method,
            request.url
        );
        self.signals.emit(Signal::RequestIssued {
            firing,
            element: owner,
            method: request.method,
            url: request.url.to_string(),
        });
        self.in_flight.insert(
            firing,
            Firing {
                owner,
                owner_name,
                swaps: spec.swaps,
            },
        );
        let tx = self.bus.evt_tx.clone();
        net::spawn_fetch(self.fetcher.clone(), request, move |result| {
            let _ = tx.send(CoreEvent::FetchDone { firing, result });
        });
    }

    pub(super) fn on_fetch_done(&mut self, firing: FiringId, result: Result<Response, NetError>) {
        let Some(Firing {
            owner,
            owner_name,
            swaps,
        }) = self.in_flight.remove(&firing)
        else {
            log::warn!(target: "zjax.swap", "response for unknown firing {firing}");
            return;
        };
        let response = match result.and_then(Response::error_for_status) {
            Ok(response) => response,
            Err(e) => return self.fail(Some(firing), owner, owner_name, e.into()),
        };
        self.signals.emit(Signal::ResponseReceived {
            firing,
            element: owner,
            status: response.status,
            url: response.url.clone(),
            response: collapsed_markup(&response.body),
        });

        if response.content_type.is_some() && !html::is_html(response.content_type.as_deref()) {
            log::warn!(
                target: "zjax.swap",
                "{owner_name}: parsing {} response from {} as HTML",
                response.content_type.as_deref().unwrap_or_default(),
                response.url
            );
        }
        let fragment = parse_fragment(&mut self.doc, &response.body);
        let mut settle = Settle::new(firing, owner);
        let mut outcome = Ok(());
        for rule in &swaps {
            outcome = self.apply_swap(fragment, rule, &mut settle);
            self.flush_mutations();
            if outcome.is_err() {
                break;
            }
        }
        self.doc.purge(fragment);
        self.flush_mutations();

        match outcome {
            Ok(()) => {
                self.signals.emit(Signal::SwapApplied {
                    firing,
                    element: owner,
                    swaps,
                });
            }
            Err(e) => {
                settle.emit = false;
                self.fail(Some(firing), owner, owner_name, e);
            }
        }
        self.schedule_settle(settle);
    }

    /// Applies one rule. A `*` target is the document's `<body>`, which must be present in the
    /// page markup since [`html::parse_document`] does not synthesize one.
    fn apply_swap(&mut self, fragment: NodeId, rule: &SwapRule, settle: &mut Settle) -> Result<(), Error> {
        let mode = rule.swap_mode;
        let target = match &rule.target {
            SwapSelector::Wildcard => Some(self.doc.body().ok_or(Error::MissingBody)?),
            SwapSelector::Query(selector) => {
                css::query_selector(&self.doc, self.doc.root(), selector)?
            }
        };
        let Some(target) = target else {
            if mode.needs_target() {
                return Err(Error::MissingTarget {
                    selector: rule.target.to_string(),
                });
            }
            return Ok(());
        };
        match mode {
            InsertMode::None => return Ok(()),
            InsertMode::Delete => {
                log::debug!(target: "zjax.swap", "deleting {}", pretty_node_name(&self.doc, target));
                self.doc.remove(target)?;
                return Ok(());
            }
            _ => {}
        }
        let response = match &rule.response {
            SwapSelector::Wildcard => {
                self.merge_response_head(fragment, settle)?;
                Some(
                    self.doc
                        .find_descendant(fragment, |doc, n| doc.is_tag(n, "body"))
                        .unwrap_or(fragment),
                )
            }
            SwapSelector::Query(selector) => css::query_selector(&self.doc, fragment, selector)?,
        };

        let Some(response) = response else {
            return Err(Error::MissingSource {
                selector: rule.response.to_string(),
            });
        };

        // The children of `content` are what gets swapped in.
        let holder = if rule.response_mode == InsertMode::Inner || response == fragment {
            None
        } else {
            let holder = self.doc.create_fragment();
            self.doc.append_child(holder, response)?;
            Some(holder)
        };
        let content = holder.unwrap_or(response);

        // Nested bindings go live before the content is inserted.
        let mut report = ScanReport::default();
        let incoming: Vec<NodeId> = descendants(&self.doc, content)
            .filter(|n| self.doc.is_element(*n))
            .collect();
        for node in incoming {
            self.scan_node(node, &mut report);
        }

        self.freeze_settle_attributes(target, content, settle)?;

        let animate = self.config.transitions && self.transitions.start(&self.doc, target);
        let result = self.swap_nodes(target, content, mode, settle);
        if let Some(holder) = holder {
            self.doc.purge(holder);
        }
        let nodes = result?;
        if animate {
            self.transitions.finish(&self.doc, &nodes);
        }
        if mode.writes_inside() {
            settle.scope.push(target);
        }
        settle.scope.extend(nodes);
        log::debug!(target: "zjax.swap", "swapped {rule}");
        Ok(())
    }

    fn swap_nodes(
        &mut self,
        target: NodeId,
        content: NodeId,
        mode: InsertMode,
        settle: &mut Settle,
    ) -> Result<Vec<NodeId>, Error> {
        let incoming = self.doc.children(content).to_vec();
        let parent_of = |page: &Page| {
            page.doc.parent(target).ok_or(DomError::NotAChild {
                parent: page.doc.root(),
                child: target,
            })
        };
        match mode {
            InsertMode::Outer | InsertMode::Inner => {
                let mut pairs = MorphedPairs::default();
                let outcome = morph::reconcile(
                    &mut self.doc,
                    target,
                    content,
                    mode,
                    &self.config.morph,
                    &mut pairs,
                )?;
                for (old, new) in pairs.0 {
                    self.adopt_bindings(old, new);
                }
                settle.pending_loads.extend(outcome.pending_loads);
                return Ok(outcome.nodes);
            }
            InsertMode::Before => {
                let parent = parent_of(self)?;
                for node in &incoming {
                    self.doc.insert_before(parent, *node, Some(target))?;
                }
            }
            InsertMode::After => {
                let parent = parent_of(self)?;
                let reference = self.doc.next_sibling(target);
                for node in &incoming {
                    self.doc.insert_before(parent, *node, reference)?;
                }
            }
            InsertMode::Prepend => {
                let reference = self.doc.first_child(target);
                for node in &incoming {
                    self.doc.insert_before(target, *node, reference)?;
                }
            }
            InsertMode::Append => {
                for node in &incoming {
                    self.doc.append_child(target, *node)?;
                }
            }
            InsertMode::Delete | InsertMode::None => {
                return Err(morph::MorphError::UnknownSwapMode(mode).into());
            }
        }
        Ok(incoming)
    }

    /// Gives response nodes that share an id with the target subtree the target's current
    /// attributes, remembering their own for settle.
    fn freeze_settle_attributes(
        &mut self,
        target: NodeId,
        content: NodeId,
        settle: &mut Settle,
    ) -> Result<(), Error> {
        let exempt = self.config.settle_exempt.clone();
        let live: Vec<(NodeId, String)> = elements_inclusive(&self.doc, target)
            .filter_map(|n| {
                self.doc
                    .element_id(n)
                    .filter(|id| !id.is_empty())
                    .map(|id| (n, id.to_string()))
            })
            .collect();
        for (node, id) in live {
            if settle.has_id(&id) {
                continue;
            }
            let Some(incoming) =
                descendants(&self.doc, content).find(|n| self.doc.element_id(*n) == Some(id.as_str()))
            else {
                continue;
            };
            let deferred = settle_attributes(&self.doc, incoming, &exempt);
            let current = settle_attributes(&self.doc, node, &exempt);
            morph::apply_attributes(&mut self.doc, incoming, &current, &exempt)?;
            settle.attributes.push((id, deferred));
        }
        Ok(())
    }

    /// Merges the response's `<head>` into the page's, for whole-response swaps.
    fn merge_response_head(&mut self, fragment: NodeId, settle: &mut Settle) -> Result<(), Error> {
        let Some(live_head) = self.doc.head() else {
            return Ok(());
        };
        let Some(new_head) = self
            .doc
            .find_descendant(fragment, |doc, n| doc.is_tag(n, "head"))
        else {
            return Ok(());
        };
        let holder = self.doc.create_fragment();
        self.doc.append_child(holder, new_head)?;
        let result = morph::reconcile(
            &mut self.doc,
            live_head,
            holder,
            InsertMode::Outer,
            &self.config.morph,
            &mut morph::NoCallbacks,
        );
        self.doc.purge(holder);
        settle.pending_loads.extend(result?.pending_loads);
        Ok(())
    }

    fn schedule_settle(&mut self, mut settle: Settle) {
        let loads = std::mem::take(&mut settle.pending_loads);
        for node in &loads {
            let Some(href) = external_resource_url(&self.doc, *node).map(str::to_string) else {
                continue;
            };
            let request = match Request::new(HttpMethod::Get, &self.base_url, &href, None) {
                Ok(request) => request,
                Err(e) => {
                    log::warn!(target: "zjax.swap", "skipping head resource: {e}");
                    continue;
                }
            };
            settle.remaining += 1;
            let tx = self.bus.evt_tx.clone();
            let (firing, node) = (settle.firing, *node);
            net::spawn_fetch(self.fetcher.clone(), request, move |result| {
                let ok = result.is_ok_and(|r| r.is_success());
                let _ = tx.send(CoreEvent::ResourceLoaded { firing, node, ok });
            });
        }
        if settle.remaining == 0 {
            self.ticks.push_back(Task::Settle(settle));
        } else {
            self.settling.insert(settle.firing, settle);
        }
    }

    pub(super) fn on_resource_loaded(&mut self, firing: FiringId, node: NodeId, ok: bool) {
        if !ok {
            log::warn!(
                target: "zjax.swap",
                "head resource {} failed to load",
                pretty_node_name(&self.doc, node)
            );
        }
        let Some(settle) = self.settling.get_mut(&firing) else {
            return;
        };
        settle.remaining = settle.remaining.saturating_sub(1);
        if settle.remaining == 0
            && let Some(settle) = self.settling.remove(&firing)
        {
            self.ticks.push_back(Task::Settle(settle));
        }
    }

    /// Applies the held-back response attributes and emits [`Signal::Settled`].
    pub(super) fn settle(&mut self, settle: Settle) {
        let mut settled_ids = Vec::new();
        let mut report = ScanReport::default();
        for (id, attributes) in &settle.attributes {
            let node = settle
                .scope
                .iter()
                .filter(|root| self.doc.is_connected(**root))
                .find_map(|root| self.doc.element_by_id(*root, id));
            let Some(node) = node else {
                continue;
            };
            let mut exempt = self.config.settle_exempt.clone();
            if self.config.morph.ignore_active_value && self.doc.active_element() == Some(node) {
                exempt.push("value".to_string());
            }
            if let Err(e) = morph::apply_attributes(&mut self.doc, node, attributes, &exempt) {
                let name = pretty_node_name(&self.doc, settle.owner);
                return self.fail(Some(settle.firing), settle.owner, name, e.into());
            }
            self.scan_node(node, &mut report);
            settled_ids.push(id.clone());
        }
        if settle.emit {
            self.signals.emit(Signal::Settled {
                firing: settle.firing,
                element: settle.owner,
                element_ids: settled_ids,
            });
        }
    }

    pub(super) fn fail(
        &mut self,
        firing: Option<FiringId>,
        node: NodeId,
        node_name: String,
        error: Error,
    ) {
        let err = FiringError {
            node,
            node_name,
            error,
        };
        log::error!(target: "zjax.swap", "Unable to execute z-swap: {err}");
        self.signals.emit(Signal::Failed {
            firing,
            element: node,
            error: err.to_string(),
        });
    }
}
