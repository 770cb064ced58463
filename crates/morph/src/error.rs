use grammar::InsertMode;
use html::{DomError, NodeId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MorphError {
    #[error("cannot morph with swap mode {0}; only outer and inner are supported")]
    UnknownSwapMode(InsertMode),
    #[error("outer morph target {0} has no parent")]
    DetachedTarget(NodeId),
    #[error(transparent)]
    Dom(#[from] DomError),
}
