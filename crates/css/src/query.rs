//! Tree-query capability: `querySelector`-style lookups over the arena document.

use crate::matching::matches_list;
use crate::syntax::{SelectorError, SelectorList, parse_selector_list};
use html::traverse::descendants;
use html::{Document, NodeId};

/// First descendant of `root` (document order, `root` excluded) matching `selector`.
pub fn query_selector(
    doc: &Document,
    root: NodeId,
    selector: &str,
) -> Result<Option<NodeId>, SelectorError> {
    let list = parse_selector_list(selector)?;
    Ok(descendants(doc, root).find(|id| matches_list(doc, *id, &list)))
}

pub fn query_selector_all(
    doc: &Document,
    root: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, SelectorError> {
    let list = parse_selector_list(selector)?;
    Ok(select_all(doc, root, &list))
}

pub fn select_all(doc: &Document, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
    descendants(doc, root)
        .filter(|id| matches_list(doc, *id, list))
        .collect()
}

/// Like [`query_selector_all`] but also tests `root` itself, first.
pub fn query_selector_all_inclusive(
    doc: &Document,
    root: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, SelectorError> {
    let list = parse_selector_list(selector)?;
    let mut out = Vec::new();
    if matches_list(doc, root, &list) {
        out.push(root);
    }
    out.extend(select_all(doc, root, &list));
    Ok(out)
}

pub fn matches(doc: &Document, id: NodeId, selector: &str) -> Result<bool, SelectorError> {
    let list = parse_selector_list(selector)?;
    Ok(matches_list(doc, id, &list))
}

/// Nearest inclusive ancestor matching `selector`.
pub fn closest(doc: &Document, id: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
    let list = parse_selector_list(selector)?;
    Ok(std::iter::successors(Some(id), |n| doc.parent(*n)).find(|n| matches_list(doc, *n, &list)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::parse_document;

    #[test]
    fn query_selector_returns_first_in_document_order() {
        let doc = parse_document(
            r#"<body><div class="x" id="one"><p class="x" id="two"></p></div><p class="x" id="three"></p></body>"#,
        );
        let first = query_selector(&doc, doc.root(), ".x").expect("selector");
        assert_eq!(first.and_then(|id| doc.element_id(id)), Some("one"));
        let all = query_selector_all(&doc, doc.root(), "p.x").expect("selector");
        let ids: Vec<&str> = all.iter().filter_map(|id| doc.element_id(*id)).collect();
        assert_eq!(ids, ["two", "three"]);
    }

    #[test]
    fn query_excludes_root_but_inclusive_variant_does_not() {
        let doc = parse_document(r#"<section id="panel"><section id="inner"></section></section>"#);
        let panel = doc.element_by_id(doc.root(), "panel").expect("panel");
        let found = query_selector(&doc, panel, "section").expect("selector");
        assert_eq!(found.and_then(|id| doc.element_id(id)), Some("inner"));
        let inclusive = query_selector_all_inclusive(&doc, panel, "[id]").expect("selector");
        assert_eq!(inclusive.len(), 2);
        assert_eq!(inclusive[0], panel);
    }

    #[test]
    fn closest_walks_up_inclusive() {
        let doc = parse_document(r#"<form id="f"><div><button id="b"></button></div></form>"#);
        let b = doc.element_by_id(doc.root(), "b").expect("button");
        let form = closest(&doc, b, "form").expect("selector");
        assert_eq!(form.and_then(|id| doc.element_id(id)), Some("f"));
        assert_eq!(closest(&doc, b, "button").expect("selector"), Some(b));
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let doc = parse_document("<p></p>");
        assert!(query_selector(&doc, doc.root(), "p[").is_err());
    }
}
