//! Page-level orchestration.
//!
//! Invariants:
//! - All document mutation happens on the thread that owns the `Page`. Fetches run on worker
//!   threads and report back through the bus as [`CoreEvent`]s, handled in [`Page::pump`].
//! - Every binding has exactly one structural watch. Mutation batches are flushed after each
//!   swap step and action, so listeners of removed nodes are gone before the next event.
//! - Settle work queued during one pump runs at the start of the next one, never in the
//!   same pump as the swap that produced it.

use crate::bindings::Bindings;
use crate::observer::Observer;
use crate::registry::ActionRegistry;
use crate::transitions::{NoTransitions, ViewTransitions};
use crate::{Config, Error};
use bus::{Bus, CoreEvent, Signal, SignalHub};
use core_types::{BindingId, FiringId};
use html::{Document, NodeId, parse_document};
use net::{Fetcher, HttpFetcher};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use url::Url;

mod actions;
mod scan;
mod swap;

pub use scan::ScanReport;
use swap::{Firing, Settle};

enum Task {
    Load(BindingId),
    Settle(Settle),
}

pub struct Page {
    doc: Document,
    config: Config,
    base_url: Url,
    fetcher: Arc<dyn Fetcher>,
    bus: Bus,
    signals: SignalHub,
    actions: ActionRegistry,
    bindings: Bindings,
    observer: Observer,
    transitions: Box<dyn ViewTransitions>,
    in_flight: HashMap<FiringId, Firing>,
    settling: HashMap<FiringId, Settle>,
    ticks: VecDeque<Task>,
    next_firing: FiringId,
}

impl Page {
    pub fn new(doc: Document, config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let base_url = config.base_url()?;
        Ok(Self {
            doc,
            config,
            base_url,
            fetcher,
            bus: Bus::new(),
            signals: SignalHub::default(),
            actions: ActionRegistry::new(),
            bindings: Bindings::default(),
            observer: Observer::default(),
            transitions: Box::new(NoTransitions),
            in_flight: HashMap::new(),
            settling: HashMap::new(),
            ticks: VecDeque::new(),
            next_firing: 0,
        })
    }

    pub fn from_html(html: &str, config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        Self::new(parse_document(html), config, fetcher)
    }

    /// A page that fetches over HTTP using the config's user agent and timeout.
    pub fn with_http(html: &str, config: Config) -> Result<Self, Error> {
        let fetcher = HttpFetcher::new(&config.fetch_config())?;
        Self::from_html(html, config, Arc::new(fetcher))
    }

    // -- Accessors ---
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Direct document access. Structural changes made here are observed on the next
    /// [`Page::pump`] or [`Page::dispatch`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    pub fn subscribe(&mut self) -> Receiver<Signal> {
        self.signals.subscribe()
    }

    pub fn set_view_transitions(&mut self, transitions: Box<dyn ViewTransitions>) {
        self.transitions = transitions;
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn listener_count(&self) -> usize {
        self.bindings.listener_count()
    }

    pub fn watch_count(&self) -> usize {
        self.observer.len()
    }

    /// Number of bindings currently attached to `node`.
    pub fn bindings_on(&self, node: NodeId) -> usize {
        self.bindings.owned_by(node).len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// First element in the document matching `selector`.
    pub fn query(&self, selector: &str) -> Result<Option<NodeId>, Error> {
        Ok(css::query_selector(&self.doc, self.doc.root(), selector)?)
    }

    // -- Events ---

    /// Delivers `event` to `node` and then to each of its ancestors, firing every binding
    /// listening for it. Returns the number of bindings fired.
    pub fn dispatch(&mut self, node: NodeId, event: &str) -> usize {
        self.flush_mutations();
        let path: Vec<NodeId> = std::iter::once(node)
            .chain(html::traverse::ancestors(&self.doc, node))
            .collect();
        let mut fired = 0;
        for current in path {
            for binding in self.bindings.listening(current, event) {
                if self.fire(binding, event) {
                    fired += 1;
                }
            }
        }
        if self.config.parse_on.iter().any(|e| e == event) {
            let root = self.doc.root();
            self.parse(root);
        }
        fired
    }

    fn fire(&mut self, id: BindingId, event: &str) -> bool {
        let Some(binding) = self.bindings.get(id) else {
            return false;
        };
        let node = binding.node;
        match binding.handler.clone() {
            crate::bindings::Handler::Swap(spec) => self.fire_swap(node, event, spec),
            crate::bindings::Handler::Action(spec) => self.fire_action(node, event, &spec.handler),
        }
        true
    }

    // -- Loop ---

    /// Runs queued tasks, then handles every completion already on the bus.
    /// Returns whether anything happened.
    pub fn pump(&mut self) -> bool {
        let mut progressed = self.flush_mutations();
        let due: Vec<Task> = self.ticks.drain(..).collect();
        progressed |= !due.is_empty();
        for task in due {
            self.run_task(task);
        }
        while let Ok(evt) = self.bus.evt_rx.try_recv() {
            self.on_core_event(evt);
            progressed = true;
        }
        progressed
    }

    /// Nothing in flight, nothing waiting on resources and no queued tasks.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.settling.is_empty() && self.ticks.is_empty()
    }

    /// Pumps until [`Page::is_idle`], blocking on the bus in between. Returns `false` if
    /// `timeout` ran out first.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.is_idle() {
                return true;
            }
            if !self.ticks.is_empty() {
                continue;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.bus.evt_rx.recv_timeout(deadline - now) {
                Ok(evt) => self.on_core_event(evt),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::warn!(
            target: "zjax.swap",
            "page not idle after {} ms: {} in flight, {} settling",
            timeout.as_millis(),
            self.in_flight.len(),
            self.settling.len()
        );
        false
    }

    fn on_core_event(&mut self, evt: CoreEvent) {
        match evt {
            CoreEvent::FetchDone { firing, result } => self.on_fetch_done(firing, result),
            CoreEvent::ResourceLoaded { firing, node, ok } => {
                self.on_resource_loaded(firing, node, ok)
            }
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Load(binding) => {
                let connected = self
                    .bindings
                    .get(binding)
                    .is_some_and(|b| self.doc.is_connected(b.node));
                if connected {
                    self.fire(binding, "load");
                }
            }
            Task::Settle(settle) => self.settle(settle),
        }
    }

    /// Hands the pending mutation batch to the observer. Detached nodes from the batch are
    /// purged first so their bindings go with them.
    fn flush_mutations(&mut self) -> bool {
        let batch = self.doc.take_mutations();
        for record in &batch {
            for node in &record.removed {
                if self.doc.contains_node(*node) && self.doc.parent(*node).is_none() {
                    self.doc.purge(*node);
                }
            }
        }
        for binding in self.observer.observe(&self.doc, &batch) {
            if let Some(b) = self.bindings.remove(binding) {
                log::debug!(
                    target: "zjax.observer",
                    "removed {} listener(s) for {} from {}",
                    b.listeners.len(),
                    b.attr,
                    b.node
                );
            }
        }
        !batch.is_empty()
    }

    fn next_firing(&mut self) -> FiringId {
        self.next_firing += 1;
        self.next_firing
    }
}
