use crate::document::{Document, NodeData};
use crate::types::NodeId;
use std::fmt;

/// Deterministic tree rendering and structural equality for tests.
/// Not a stable format.
///
/// Equivalence rules:
/// - Node kinds and element names must match.
/// - Attribute order is ignored; names and values must match.
/// - Text, comments and doctypes must match exactly.
/// - Whitespace-only text nodes can be ignored by options.
#[derive(Clone, Copy, Debug)]
pub struct DomSnapshotOptions {
    pub ignore_whitespace_text: bool,
}

impl Default for DomSnapshotOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace_text: true,
        }
    }
}

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(doc: &Document, root: NodeId, options: DomSnapshotOptions) -> Self {
        let mut lines = Vec::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(label) = node_label(doc, id, &options) else {
                continue;
            };
            lines.push(format!("{}{}", "  ".repeat(depth), label));
            for child in doc.children(id).iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn node_label(doc: &Document, id: NodeId, options: &DomSnapshotOptions) -> Option<String> {
    Some(match doc.data(id)? {
        NodeData::Document => "#document".to_string(),
        NodeData::Fragment => "#fragment".to_string(),
        NodeData::Doctype(text) => format!("<!{text}>"),
        NodeData::Comment(text) => format!("<!--{text}-->"),
        NodeData::Text(text) => {
            if options.ignore_whitespace_text && text.trim().is_empty() {
                return None;
            }
            format!("{text:?}")
        }
        NodeData::Element(el) => {
            let mut attrs: Vec<String> = el
                .attributes
                .iter()
                .map(|a| format!("{}={:?}", a.name, a.value))
                .collect();
            attrs.sort();
            if attrs.is_empty() {
                format!("<{}>", el.name)
            } else {
                format!("<{} {}>", el.name, attrs.join(" "))
            }
        }
    })
}

#[derive(Debug)]
pub struct DomMismatch {
    pub line: usize,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for DomMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DOM mismatch at snapshot line {}", self.line)?;
        writeln!(f, "expected:\n{}", self.expected)?;
        write!(f, "actual:\n{}", self.actual)
    }
}

impl std::error::Error for DomMismatch {}

pub fn compare_dom(
    expected: (&Document, NodeId),
    actual: (&Document, NodeId),
    options: DomSnapshotOptions,
) -> Result<(), DomMismatch> {
    let expected = DomSnapshot::new(expected.0, expected.1, options);
    let actual = DomSnapshot::new(actual.0, actual.1, options);
    let differs_at = expected
        .as_lines()
        .iter()
        .zip(actual.as_lines())
        .position(|(e, a)| e != a)
        .or_else(|| {
            (expected.as_lines().len() != actual.as_lines().len())
                .then(|| expected.as_lines().len().min(actual.as_lines().len()))
        });
    match differs_at {
        None => Ok(()),
        Some(line) => Err(DomMismatch {
            line,
            expected: expected.render(),
            actual: actual.render(),
        }),
    }
}

pub fn assert_dom_eq(expected: (&Document, NodeId), actual: (&Document, NodeId)) {
    if let Err(mismatch) = compare_dom(expected, actual, DomSnapshotOptions::default()) {
        panic!("{mismatch}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_fragment;

    #[test]
    fn attribute_order_and_whitespace_text_are_ignored() {
        let mut doc = Document::new();
        let a = parse_fragment(&mut doc, r#"<div id="x" class="y">  <p>t</p></div>"#);
        let b = parse_fragment(&mut doc, r#"<div class="y" id="x"><p>t</p></div>"#);
        assert_dom_eq((&doc, a), (&doc, b));
    }

    #[test]
    fn text_difference_is_reported() {
        let mut doc = Document::new();
        let a = parse_fragment(&mut doc, "<p>one</p>");
        let b = parse_fragment(&mut doc, "<p>two</p>");
        let err = compare_dom((&doc, a), (&doc, b), DomSnapshotOptions::default())
            .expect_err("expected mismatch");
        assert_eq!(err.line, 2);
    }
}
