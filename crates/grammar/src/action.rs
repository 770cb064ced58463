//! `z-action` attribute parsing: leading `@event` tokens, then a handler reference.

use crate::error::GrammarError;
use crate::swap::{resolve_triggers, split_triggers};
use crate::types::{ActionHandler, ActionSpec};
use html::{Document, NodeId};

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// `name` or `namespace.name`; anything else is an inline expression.
fn classify_handler(source: &str) -> ActionHandler {
    let named = match source.split_once('.') {
        Some((ns, name)) if is_word(ns) && is_word(name) => Some((Some(ns), name)),
        None if is_word(source) => Some((None, source)),
        _ => None,
    };
    match named {
        Some((namespace, name)) => ActionHandler::Named {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        },
        None => ActionHandler::Inline(source.to_string()),
    }
}

pub fn parse_action(value: &str, doc: &Document, owner: NodeId) -> Result<ActionSpec, GrammarError> {
    let value = value.trim();
    let mut split_at = 0;
    let mut leading = Vec::new();
    // Only the leading run of `@` tokens are triggers; `@` later belongs to the expression.
    for token in value.split_whitespace() {
        if !token.starts_with('@') {
            break;
        }
        leading.push(token);
        let offset = token.as_ptr() as usize - value.as_ptr() as usize;
        split_at = offset + token.len();
    }
    let (events, _) = split_triggers(leading)?;
    let source = value[split_at..].trim();
    if source.is_empty() {
        return Err(GrammarError::MissingActionHandler);
    }
    let handler = classify_handler(source);
    let triggers = resolve_triggers(events, doc, owner)?;
    log::trace!(target: "zjax.grammar", "parsed z-action {value:?} as {handler}");
    Ok(ActionSpec { triggers, handler })
}
