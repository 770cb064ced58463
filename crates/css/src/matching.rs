use crate::syntax::{AttrOp, Combinator, ComplexSelector, Compound, Selector, SelectorList};
use html::{Document, NodeId};

fn matches_simple(doc: &Document, id: NodeId, selector: &Selector) -> bool {
    match selector {
        Selector::Universal => true,
        Selector::Type(t) => doc.is_tag(id, t),
        Selector::Id(want) => doc.attr(id, "id") == Some(want.as_str()),
        Selector::Class(want) => doc.has_class(id, want),
        Selector::Attribute { name, op } => {
            let Some(value) = doc.attr(id, name) else {
                return false;
            };
            match op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == v,
                AttrOp::Includes(v) => value.split_ascii_whitespace().any(|w| w == v),
                AttrOp::DashMatch(v) => {
                    value == v || value.strip_prefix(v.as_str()).is_some_and(|r| r.starts_with('-'))
                }
                AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
                AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
                AttrOp::Substring(v) => !v.is_empty() && value.contains(v.as_str()),
            }
        }
        Selector::FirstChild => previous_element(doc, id).is_none(),
        Selector::LastChild => next_element(doc, id).is_none(),
        Selector::Not(inner) => !matches_compound(doc, id, inner),
    }
}

pub(crate) fn matches_compound(doc: &Document, id: NodeId, compound: &Compound) -> bool {
    doc.is_element(id) && compound.parts.iter().all(|s| matches_simple(doc, id, s))
}

fn previous_element(doc: &Document, id: NodeId) -> Option<NodeId> {
    std::iter::successors(doc.previous_sibling(id), |n| doc.previous_sibling(*n))
        .find(|n| doc.is_element(*n))
}

fn next_element(doc: &Document, id: NodeId) -> Option<NodeId> {
    std::iter::successors(doc.next_sibling(id), |n| doc.next_sibling(*n))
        .find(|n| doc.is_element(*n))
}

/// Right-to-left match with backtracking over descendant/sibling combinators.
fn matches_from(doc: &Document, id: NodeId, selector: &ComplexSelector, index: usize) -> bool {
    if !matches_compound(doc, id, &selector.compounds[index]) {
        return false;
    }
    if index == 0 {
        return true;
    }
    let next = index - 1;
    match selector.links[next] {
        Combinator::Child => doc
            .parent_element(id)
            .is_some_and(|p| matches_from(doc, p, selector, next)),
        Combinator::Descendant => {
            std::iter::successors(doc.parent_element(id), |n| doc.parent_element(*n))
                .any(|p| matches_from(doc, p, selector, next))
        }
        Combinator::NextSibling => {
            previous_element(doc, id).is_some_and(|s| matches_from(doc, s, selector, next))
        }
        Combinator::SubsequentSibling => {
            std::iter::successors(previous_element(doc, id), |n| previous_element(doc, *n))
                .any(|s| matches_from(doc, s, selector, next))
        }
    }
}

pub fn matches_complex(doc: &Document, id: NodeId, selector: &ComplexSelector) -> bool {
    !selector.compounds.is_empty()
        && matches_from(doc, id, selector, selector.compounds.len() - 1)
}

pub fn matches_list(doc: &Document, id: NodeId, list: &SelectorList) -> bool {
    list.0.iter().any(|s| matches_complex(doc, id, s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_selector_list;
    use html::parse_fragment;

    fn find(doc: &Document, root: NodeId, element_id: &str) -> NodeId {
        doc.element_by_id(root, element_id)
            .unwrap_or_else(|| panic!("missing #{element_id}"))
    }

    #[test]
    fn descendant_and_child_combinators() {
        let mut doc = Document::new();
        let root = parse_fragment(
            &mut doc,
            r#"<main><ul id="list"><li id="a">a</li><li id="b"><span id="s">b</span></li></ul></main>"#,
        );
        let s = find(&doc, root, "s");
        let check = |sel: &str| {
            matches_list(&doc, s, &parse_selector_list(sel).expect("selector"))
        };
        assert!(check("main span"));
        assert!(check("li > span"));
        assert!(!check("ul > span"));
        assert!(check("li + li > #s"));
        assert!(check("#a ~ li span"));
        assert!(!check("#b ~ li span"));
    }

    #[test]
    fn attribute_operators() {
        let mut doc = Document::new();
        let root = parse_fragment(
            &mut doc,
            r#"<a id="l" href="https://example.com/docs" lang="en-US" rel="noopener external">x</a>"#,
        );
        let l = find(&doc, root, "l");
        for (sel, expected) in [
            ("[href]", true),
            (r#"[href^="https"]"#, true),
            (r#"[href$="/docs"]"#, true),
            (r#"[href*="example"]"#, true),
            ("[lang|=en]", true),
            ("[rel~=external]", true),
            ("[rel~=ext]", false),
            (r#"[href=""]"#, false),
        ] {
            let list = parse_selector_list(sel).expect("selector");
            assert_eq!(matches_list(&doc, l, &list), expected, "selector {sel}");
        }
    }

    #[test]
    fn structural_pseudo_classes_skip_text() {
        let mut doc = Document::new();
        let root = parse_fragment(&mut doc, "<ul> <li id=a></li> <li id=b class=done></li> </ul>");
        let a = find(&doc, root, "a");
        let b = find(&doc, root, "b");
        let first = parse_selector_list("li:first-child").expect("selector");
        let open = parse_selector_list("li:not(.done)").expect("selector");
        assert!(matches_list(&doc, a, &first));
        assert!(!matches_list(&doc, b, &first));
        assert!(matches_list(&doc, a, &open));
        assert!(!matches_list(&doc, b, &open));
    }
}
