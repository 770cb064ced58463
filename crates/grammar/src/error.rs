use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("must have between 1 and 4 parts separated by spaces, found {0}")]
    TokenCount(usize),
    #[error("more than one {kind} given: {token:?}")]
    DuplicateToken { kind: &'static str, token: String },
    #[error("trigger token \"@\" has no event name")]
    EmptyTrigger,
    #[error("invalid swap type: {0}")]
    InvalidSwapType(String),
    #[error("wildcard \"*\" can not be piped to a {side}")]
    WildcardRestriction { side: &'static str },
    #[error("malformed swap rule: {0:?}")]
    MalformedSwapRule(String),
    #[error("swap rule has an empty target selector")]
    EmptySelector,
    #[error("invalid selector {selector:?}: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: css::SelectorError,
    },
    #[error("no swap rule given")]
    MissingSwapRule,
    #[error("no endpoint inferable or specified")]
    MissingEndpoint,
    #[error("@submit trigger is only valid on a form, not <{0}>")]
    SubmitOutsideForm(String),
    #[error("z-action has no handler")]
    MissingActionHandler,
}
