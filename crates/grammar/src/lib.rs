//! Attribute grammar for `z-swap` and `z-action`.
//!
//! Parsing is pure: it reads the attribute value plus the owning element's own attributes
//! (`action`, `method`, `href`) and never touches the document otherwise.

mod action;
mod error;
mod swap;
mod types;

pub use action::parse_action;
pub use error::GrammarError;
pub use swap::{parse_swap, parse_swap_rules};
pub use types::{
    ActionHandler, ActionSpec, InsertMode, RequestSpec, SwapRule, SwapSelector, SwapSpec,
    TriggerSpec,
};

pub const SWAP_ATTR: &str = "z-swap";
pub const ACTION_ATTR: &str = "z-action";
