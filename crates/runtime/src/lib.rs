//! The page runtime: binds `z-swap`/`z-action` attributes, fires requests and actions,
//! and reconciles responses into the live document.
//!
//! ```text
//! scan ─► bind listeners ─► event ─► fetch (worker thread) ─► bus ─► swap/morph ─► settle
//!                 ▲                                                      │
//!                 └──────────── pre-scan of response content ◄───────────┘
//! ```
//!
//! Everything that touches the document runs on the caller's thread inside [`Page`]; drive
//! it with [`Page::dispatch`] and [`Page::pump`] (or [`Page::run_until_idle`]).

mod bindings;
mod config;
mod error;
mod observer;
mod page;
mod registry;
mod transitions;

pub use config::Config;
pub use error::{Error, FiringError};
pub use page::{Page, ScanReport};
pub use registry::{ActionContext, ActionFn, ActionRegistry, RESERVED_NAMESPACE, action};
pub use transitions::{NoTransitions, ViewTransitions};

pub use bus::Signal;
pub use js::Value;
