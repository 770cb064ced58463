//! `z-swap` attribute parsing.
//!
//! Tokens are classified by shape rather than position: `@event` is a trigger, one of the five
//! HTTP verbs is the method, `/..`, `./..`, `http(s)://..` or `.` is the endpoint. Whatever is
//! left is joined back together and read as the swap-rule list.

use crate::error::GrammarError;
use crate::types::{InsertMode, RequestSpec, SwapRule, SwapSelector, SwapSpec, TriggerSpec};
use core_types::HttpMethod;
use html::{Document, NodeId};
use std::str::FromStr;

pub(crate) const MAX_TOKENS: usize = 4;

/// Removes whitespace on either side of every comma so a rule list stays one token.
pub(crate) fn collapse_commas(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_ws = false;
    for c in value.trim().chars() {
        if c.is_whitespace() {
            pending_ws = true;
            continue;
        }
        if c == ',' {
            pending_ws = false;
            out.push(',');
            continue;
        }
        if pending_ws && !out.ends_with(',') {
            out.push(' ');
        }
        pending_ws = false;
        out.push(c);
    }
    out
}

pub(crate) fn is_endpoint(token: &str) -> bool {
    token == "."
        || token.starts_with('/')
        || token.starts_with("./")
        || token.starts_with("http://")
        || token.starts_with("https://")
}

/// Collects `@event` tokens into trigger names; the remaining tokens are returned untouched.
pub(crate) fn split_triggers<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<(Vec<String>, Vec<&'a str>), GrammarError> {
    let mut events = Vec::new();
    let mut rest = Vec::new();
    for token in tokens {
        match token.strip_prefix('@') {
            Some("") => return Err(GrammarError::EmptyTrigger),
            Some(event) => events.push(event.to_string()),
            None => rest.push(token),
        }
    }
    Ok((events, rest))
}

/// Builds trigger specs, falling back to the element's natural event.
pub(crate) fn resolve_triggers(
    events: Vec<String>,
    doc: &Document,
    owner: NodeId,
) -> Result<Vec<TriggerSpec>, GrammarError> {
    let is_form = doc.is_tag(owner, "form");
    if !is_form && events.iter().any(|e| e == "submit") {
        let tag = doc.tag_name(owner).unwrap_or_default().to_string();
        return Err(GrammarError::SubmitOutsideForm(tag));
    }
    let events = if events.is_empty() {
        vec![if is_form { "submit" } else { "click" }.to_string()]
    } else {
        events
    };
    Ok(events
        .into_iter()
        .map(|event| TriggerSpec {
            event,
            source: owner,
        })
        .collect())
}

/// Forms use their declared verb; anything else on a form (missing, `dialog`) posts.
fn infer_method(doc: &Document, owner: NodeId) -> HttpMethod {
    if !doc.is_tag(owner, "form") {
        return HttpMethod::Get;
    }
    doc.attr(owner, "method")
        .and_then(|declared| HttpMethod::from_str(declared.trim()).ok())
        .unwrap_or(HttpMethod::Post)
}

fn infer_endpoint(doc: &Document, owner: NodeId) -> Result<String, GrammarError> {
    if doc.is_tag(owner, "form") {
        return Ok(match doc.attr(owner, "action").map(str::trim) {
            Some(action) if !action.is_empty() => action.to_string(),
            _ => ".".to_string(),
        });
    }
    if doc.is_tag(owner, "a")
        && let Some(href) = doc.attr(owner, "href").map(str::trim)
        && !href.is_empty()
    {
        return Ok(href.to_string());
    }
    Err(GrammarError::MissingEndpoint)
}

fn parse_side(side: &str) -> Result<(SwapSelector, Option<InsertMode>), GrammarError> {
    let (selector, mode) = match side.split_once('|') {
        Some((selector, mode)) => (selector.trim(), Some(mode.trim())),
        None => (side.trim(), None),
    };
    if selector.is_empty() {
        return Err(GrammarError::EmptySelector);
    }
    let mode = match mode {
        Some(m) => Some(
            InsertMode::from_str(m).map_err(|()| GrammarError::InvalidSwapType(m.to_string()))?,
        ),
        None => None,
    };
    let selector = SwapSelector::parse(selector);
    if let SwapSelector::Query(q) = &selector {
        css::parse_selector_list(q).map_err(|source| GrammarError::InvalidSelector {
            selector: q.clone(),
            source,
        })?;
    }
    Ok((selector, mode))
}

fn parse_rule(rule: &str) -> Result<SwapRule, GrammarError> {
    let pieces: Vec<&str> = rule.split("->").collect();
    let (response, target) = match pieces.as_slice() {
        [target] => (None, *target),
        [response, target] => (Some(*response), *target),
        _ => return Err(GrammarError::MalformedSwapRule(rule.to_string())),
    };
    let (target, swap_mode) = parse_side(target)?;
    let swap_mode = swap_mode.unwrap_or_default();
    let (response, response_mode) = match response {
        Some(side) => {
            let (selector, mode) = parse_side(side)?;
            (selector, mode.unwrap_or_default())
        }
        // The omitted side mirrors the target; content-only swaps take content only.
        None => {
            let mode = if swap_mode.writes_inside() {
                InsertMode::Inner
            } else {
                InsertMode::Outer
            };
            (target.clone(), mode)
        }
    };
    if response.is_wildcard() && response_mode != InsertMode::Outer {
        return Err(GrammarError::WildcardRestriction { side: "response" });
    }
    if target.is_wildcard() && swap_mode != InsertMode::Outer {
        return Err(GrammarError::WildcardRestriction { side: "target" });
    }
    Ok(SwapRule {
        response,
        target,
        response_mode,
        swap_mode,
    })
}

/// Parses the comma-separated rule list.
pub fn parse_swap_rules(value: &str) -> Result<Vec<SwapRule>, GrammarError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GrammarError::MissingSwapRule);
    }
    value.split(',').map(|rule| parse_rule(rule.trim())).collect()
}

/// Parses a `z-swap` value in the context of its owning element.
pub fn parse_swap(value: &str, doc: &Document, owner: NodeId) -> Result<SwapSpec, GrammarError> {
    let collapsed = collapse_commas(value);
    let tokens: Vec<&str> = collapsed.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > MAX_TOKENS {
        return Err(GrammarError::TokenCount(tokens.len()));
    }

    let (events, rest) = split_triggers(tokens)?;
    let mut method = None;
    let mut endpoint = None;
    let mut leftovers = Vec::new();
    for token in rest {
        if let Ok(m) = HttpMethod::from_str(token) {
            if method.replace(m).is_some() {
                return Err(GrammarError::DuplicateToken {
                    kind: "method",
                    token: token.to_string(),
                });
            }
        } else if is_endpoint(token) {
            if endpoint.replace(token.to_string()).is_some() {
                return Err(GrammarError::DuplicateToken {
                    kind: "endpoint",
                    token: token.to_string(),
                });
            }
        } else {
            leftovers.push(token);
        }
    }

    let swaps = parse_swap_rules(&leftovers.join(" "))?;
    let triggers = resolve_triggers(events, doc, owner)?;
    let method = match method {
        Some(m) => m,
        None => infer_method(doc, owner),
    };
    let endpoint = match endpoint {
        Some(e) => e,
        None => infer_endpoint(doc, owner)?,
    };
    log::trace!(
        target: "zjax.grammar",
        "parsed z-swap {value:?}: {method} {endpoint} with {} rule(s)",
        swaps.len()
    );
    Ok(SwapSpec {
        triggers,
        request: RequestSpec { method, endpoint },
        swaps,
    })
}
