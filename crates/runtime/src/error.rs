use css::SelectorError;
use grammar::GrammarError;
use html::{Document, DomError, NodeId};
use js::{CompileError, EvalError};
use morph::MorphError;
use net::NetError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("target node {selector:?} does not exist in the document")]
    MissingTarget { selector: String },
    #[error("source node {selector:?} does not exist in the response")]
    MissingSource { selector: String },
    /// A `*` target on a page whose markup has no `<body>` tag.
    #[error("unable to find a body element to swap into")]
    MissingBody,
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("invalid action expression {expression:?}: {source}")]
    InvalidActionExpression {
        expression: String,
        source: CompileError,
    },
    #[error("the {0:?} action namespace is reserved")]
    ReservedNamespace(String),
    #[error(transparent)]
    Action(#[from] EvalError),
    #[error(transparent)]
    Net(#[from] NetError),
    #[error(transparent)]
    Morph(#[from] MorphError),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

/// An [`Error`] tied to the element whose binding or firing produced it.
#[derive(Debug)]
pub struct FiringError {
    pub node: NodeId,
    /// Rendered when the error was raised, so it survives the node being purged.
    pub node_name: String,
    pub error: Error,
}

impl FiringError {
    pub fn new(doc: &Document, node: NodeId, error: impl Into<Error>) -> Self {
        Self {
            node,
            node_name: html::dom_utils::pretty_node_name(doc, node),
            error: error.into(),
        }
    }
}

impl fmt::Display for FiringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.error, self.node_name)
    }
}

impl std::error::Error for FiringError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
