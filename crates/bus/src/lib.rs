use core_types::{FiringId, HttpMethod};
use grammar::SwapRule;
use html::NodeId;
use net::{NetError, Response};
use std::sync::mpsc::{self, Receiver, Sender};

/// Lifecycle signals observable from outside the page, in firing order.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    RequestIssued {
        firing: FiringId,
        element: NodeId,
        method: HttpMethod,
        url: String,
    },
    ResponseReceived {
        firing: FiringId,
        element: NodeId,
        status: u16,
        /// Final URL after redirects.
        url: String,
        /// Response markup with newlines and whitespace runs removed, for logging.
        response: String,
    },
    SwapApplied {
        firing: FiringId,
        element: NodeId,
        swaps: Vec<SwapRule>,
    },
    Settled {
        firing: FiringId,
        element: NodeId,
        element_ids: Vec<String>,
    },
    Failed {
        firing: Option<FiringId>,
        element: NodeId,
        error: String,
    },
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::RequestIssued { .. } => "zjax:request",
            Signal::ResponseReceived { .. } => "zjax:response",
            Signal::SwapApplied { .. } => "zjax:swap",
            Signal::Settled { .. } => "zjax:settle",
            Signal::Failed { .. } => "zjax:error",
        }
    }

    pub fn firing(&self) -> Option<FiringId> {
        match self {
            Signal::RequestIssued { firing, .. }
            | Signal::ResponseReceived { firing, .. }
            | Signal::SwapApplied { firing, .. }
            | Signal::Settled { firing, .. } => Some(*firing),
            Signal::Failed { firing, .. } => *firing,
        }
    }
}

/// Completions flowing back from worker threads to the page loop.
#[derive(Debug)]
pub enum CoreEvent {
    FetchDone {
        firing: FiringId,
        result: Result<Response, NetError>,
    },
    ResourceLoaded {
        firing: FiringId,
        node: NodeId,
        ok: bool,
    },
}

pub struct Bus {
    pub evt_tx: Sender<CoreEvent>, // shareable for workers
    pub evt_rx: Receiver<CoreEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (evt_tx, evt_rx) = mpsc::channel();
        Self { evt_tx, evt_rx }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Fan-out of [`Signal`]s to any number of subscribers. Dropped receivers are pruned.
#[derive(Default)]
pub struct SignalHub {
    subscribers: Vec<Sender<Signal>>,
}

impl SignalHub {
    pub fn subscribe(&mut self) -> Receiver<Signal> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, signal: Signal) {
        log::debug!(target: "zjax.swap", "{} {:?}", signal.name(), signal.firing());
        self.subscribers.retain(|tx| tx.send(signal.clone()).is_ok());
    }
}
