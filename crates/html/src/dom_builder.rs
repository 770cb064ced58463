use crate::document::Document;
use crate::tokenizer::tokenize;
use crate::types::{NodeId, Token};

/// Parses `html` into a new, detached fragment inside `doc` and returns the fragment node.
///
/// Response bodies are parsed this way so they share the live document's arena and selectors
/// behave identically on both sides.
pub fn parse_fragment(doc: &mut Document, html: &str) -> NodeId {
    let fragment = doc.create_fragment();
    build_into(doc, fragment, &tokenize(html));
    fragment
}

/// Parses a whole page into a fresh document. Only the given markup is built; missing
/// `html`, `head` and `body` elements are not synthesized.
pub fn parse_document(html: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    build_into(&mut doc, root, &tokenize(html));
    doc.take_mutations();
    doc
}

fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "fieldset"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

struct OpenElements {
    stack: Vec<(NodeId, String)>,
}

impl OpenElements {
    fn current(&self, fallback: NodeId) -> NodeId {
        self.stack.last().map(|(id, _)| *id).unwrap_or(fallback)
    }

    fn current_is(&self, name: &str) -> bool {
        self.stack.last().is_some_and(|(_, n)| n == name)
    }

    /// Pops through the nearest open `name`, stopping at any of `barriers`.
    fn close_nearest(&mut self, name: &str, barriers: &[&str]) {
        let Some(pos) = self
            .stack
            .iter()
            .rposition(|(_, n)| n == name || barriers.contains(&n.as_str()))
        else {
            return;
        };
        if self.stack[pos].1 == name {
            self.stack.truncate(pos);
        }
    }
}

fn build_into(doc: &mut Document, container: NodeId, tokens: &[Token]) {
    let mut open = OpenElements { stack: Vec::new() };

    for token in tokens {
        let parent = open.current(container);
        // Insertions below can only fail on a malformed arena, which a fresh build never is.
        let result = match token {
            Token::Doctype(text) => {
                let node = doc.create_doctype(text);
                doc.append_child(parent, node)
            }
            Token::Comment(text) => {
                let node = doc.create_comment(text);
                doc.append_child(parent, node)
            }
            Token::Text(text) => {
                let node = doc.create_text(text);
                doc.append_child(parent, node)
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if closes_paragraph(name) && open.current_is("p") {
                    open.stack.pop();
                }
                match name.as_str() {
                    "li" => open.close_nearest("li", &["ul", "ol"]),
                    "option" => open.close_nearest("option", &["select", "datalist"]),
                    "tr" => open.close_nearest("tr", &["table", "tbody", "thead", "tfoot"]),
                    "td" | "th" => {
                        open.close_nearest("td", &["tr", "table"]);
                        open.close_nearest("th", &["tr", "table"]);
                    }
                    _ => {}
                }
                let parent = open.current(container);
                let node = doc.create_element_with(name, attributes.clone());
                let appended = doc.append_child(parent, node);
                if !*self_closing {
                    open.stack.push((node, name.clone()));
                }
                appended
            }
            Token::EndTag(name) => {
                // Unmatched end tags are ignored.
                if let Some(pos) = open.stack.iter().rposition(|(_, n)| n == name) {
                    open.stack.truncate(pos);
                }
                Ok(())
            }
        };
        if let Err(err) = result {
            log::warn!(target: "zjax.html", "dropping token during tree build: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::inner_html;

    #[test]
    fn builds_nested_structure() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, "<section id=panel><p>new</p></section>");
        assert_eq!(
            inner_html(&doc, frag),
            r#"<section id="panel"><p>new</p></section>"#
        );
        assert!(!doc.is_connected(frag));
    }

    #[test]
    fn unmatched_end_tag_is_ignored() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, "<div><span>a</b></span></div>");
        assert_eq!(inner_html(&doc, frag), "<div><span>a</span></div>");
    }

    #[test]
    fn implied_end_tags_for_lists_and_paragraphs() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, "<ul><li>a<li>b</ul><p>x<div>y</div>");
        assert_eq!(
            inner_html(&doc, frag),
            "<ul><li>a</li><li>b</li></ul><p>x</p><div>y</div>"
        );
    }

    #[test]
    fn options_close_each_other() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, "<select><option>a<option selected>b</select>");
        assert_eq!(
            inner_html(&doc, frag),
            "<select><option>a</option><option selected>b</option></select>"
        );
    }

    #[test]
    fn parse_document_attaches_to_root_without_pending_mutations() {
        let mut doc = parse_document("<!DOCTYPE html><html><body><main></main></body></html>");
        assert!(doc.body().is_some());
        assert!(doc.take_mutations().is_empty());
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 2_000;
        let mut html = String::new();
        for _ in 0..depth {
            html.push_str("<div>");
        }
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, &html);
        assert_eq!(crate::traverse::descendants(&doc, frag).count(), depth);
    }
}
