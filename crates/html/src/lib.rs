//! Arena DOM, tokenizer and fragment parser shared by the live page and response bodies.

pub mod dom_utils;
#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod form;
pub mod serialize;
pub mod traverse;

mod document;
mod dom_builder;
mod entities;
mod tokenizer;
mod types;

pub use crate::document::{
    Document, DomError, ElementData, FormState, MutationRecord, NodeData,
};
pub use crate::dom_builder::{parse_document, parse_fragment};
pub use crate::tokenizer::tokenize;
pub use crate::types::{Attribute, NodeId, NodeKind, Token};

/// Whether a `Content-Type` header value denotes HTML.
pub fn is_html(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "text/html" || essence == "application/xhtml+xml"
}

#[cfg(test)]
mod tests {
    use super::is_html;

    #[test]
    fn is_html_checks_essence_only() {
        assert!(is_html(Some("text/html; charset=utf-8")));
        assert!(is_html(Some("TEXT/HTML")));
        assert!(!is_html(Some("application/json")));
        assert!(!is_html(None));
    }
}
