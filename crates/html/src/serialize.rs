//! HTML serialization. Attribute order is preserved; empty-valued attributes print bare.

use crate::document::{Document, NodeData};
use crate::entities::{escape_attr, escape_text};
use crate::tokenizer::is_void_element;
use crate::types::NodeId;

pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(id) {
        write_node(doc, *child, &mut out);
    }
    out
}

fn is_raw_text_parent(doc: &Document, id: Option<NodeId>) -> bool {
    id.and_then(|p| doc.tag_name(p))
        .is_some_and(|n| matches!(n, "script" | "style"))
}

// Iterative so deeply nested response markup cannot blow the stack.
fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    enum Step {
        Open(NodeId),
        Close(NodeId),
    }
    let mut stack = vec![Step::Open(id)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Close(node) => {
                if let Some(name) = doc.tag_name(node) {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            Step::Open(node) => match doc.data(node) {
                None => {}
                Some(NodeData::Document) | Some(NodeData::Fragment) => {
                    for child in doc.children(node).iter().rev() {
                        stack.push(Step::Open(*child));
                    }
                }
                Some(NodeData::Doctype(text)) => {
                    out.push_str("<!");
                    out.push_str(text);
                    out.push('>');
                }
                Some(NodeData::Comment(text)) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                Some(NodeData::Text(text)) => {
                    if is_raw_text_parent(doc, doc.parent(node)) {
                        out.push_str(text);
                    } else {
                        escape_text(text, out);
                    }
                }
                Some(NodeData::Element(el)) => {
                    out.push('<');
                    out.push_str(&el.name);
                    for attr in &el.attributes {
                        out.push(' ');
                        out.push_str(&attr.name);
                        if !attr.value.is_empty() {
                            out.push_str("=\"");
                            escape_attr(&attr.value, out);
                            out.push('"');
                        }
                    }
                    out.push('>');
                    if is_void_element(&el.name) {
                        continue;
                    }
                    stack.push(Step::Close(node));
                    for child in doc.children(node).iter().rev() {
                        stack.push(Step::Open(*child));
                    }
                }
            },
        }
    }
}

/// Markup with newlines and runs of whitespace removed, for compact signal payloads.
pub fn collapsed_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut chars = markup.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\n' || ch == '\r' {
            continue;
        }
        if ch.is_whitespace() && chars.peek().is_some_and(|c| c.is_whitespace()) {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            continue;
        }
        out.push(ch);
    }
    out
}
