use core_types::HttpMethod;
use html::NodeId;
use std::fmt;
use std::str::FromStr;

/// One event name bound on the owning element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerSpec {
    pub event: String,
    pub source: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Unresolved endpoint exactly as written or inferred (`/x`, `./x`, `https://..`, `.`).
    pub endpoint: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InsertMode {
    #[default]
    Outer,
    Inner,
    Before,
    After,
    Prepend,
    Append,
    Delete,
    None,
}

impl InsertMode {
    pub const ALL: [InsertMode; 8] = [
        InsertMode::Outer,
        InsertMode::Inner,
        InsertMode::Before,
        InsertMode::After,
        InsertMode::Prepend,
        InsertMode::Append,
        InsertMode::Delete,
        InsertMode::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InsertMode::Outer => "outer",
            InsertMode::Inner => "inner",
            InsertMode::Before => "before",
            InsertMode::After => "after",
            InsertMode::Prepend => "prepend",
            InsertMode::Append => "append",
            InsertMode::Delete => "delete",
            InsertMode::None => "none",
        }
    }

    /// Whether a swap in this mode needs resolved response content.
    pub fn needs_source(self) -> bool {
        !matches!(self, InsertMode::Delete | InsertMode::None)
    }

    pub fn needs_target(self) -> bool {
        self != InsertMode::None
    }

    /// Modes that place content inside the target.
    pub fn writes_inside(self) -> bool {
        matches!(self, InsertMode::Inner | InsertMode::Prepend | InsertMode::Append)
    }
}

impl fmt::Display for InsertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsertMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InsertMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapSelector {
    /// `*`: the response body (or whole fragment) / the live document body.
    Wildcard,
    Query(String),
}

impl SwapSelector {
    pub fn parse(s: &str) -> Self {
        if s == "*" {
            SwapSelector::Wildcard
        } else {
            SwapSelector::Query(s.to_string())
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, SwapSelector::Wildcard)
    }
}

impl fmt::Display for SwapSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapSelector::Wildcard => f.write_str("*"),
            SwapSelector::Query(q) => f.write_str(q),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapRule {
    pub response: SwapSelector,
    pub target: SwapSelector,
    pub response_mode: InsertMode,
    pub swap_mode: InsertMode,
}

impl fmt::Display for SwapRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}->{}|{}",
            self.response, self.response_mode, self.target, self.swap_mode
        )
    }
}

/// Parsed `z-swap` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapSpec {
    pub triggers: Vec<TriggerSpec>,
    pub request: RequestSpec,
    pub swaps: Vec<SwapRule>,
}

/// Deferred action reference, resolved against the registry when the trigger fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionHandler {
    Named {
        namespace: Option<String>,
        name: String,
    },
    Inline(String),
}

impl fmt::Display for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionHandler::Named {
                namespace: Some(ns),
                name,
            } => write!(f, "{ns}.{name}"),
            ActionHandler::Named {
                namespace: None,
                name,
            } => f.write_str(name),
            ActionHandler::Inline(src) => f.write_str(src),
        }
    }
}

/// Parsed `z-action` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionSpec {
    pub triggers: Vec<TriggerSpec>,
    pub handler: ActionHandler,
}
