use crate::document::{Document, NodeData};
use crate::types::NodeId;

/// Short diagnostic label such as `<button id="save" class="primary">` or `#text`.
pub fn pretty_node_name(doc: &Document, id: NodeId) -> String {
    match doc.data(id) {
        None => format!("<purged {id}>"),
        Some(NodeData::Document) => "#document".to_string(),
        Some(NodeData::Fragment) => "#fragment".to_string(),
        Some(NodeData::Doctype(_)) => "#doctype".to_string(),
        Some(NodeData::Text(_)) => "#text".to_string(),
        Some(NodeData::Comment(_)) => "#comment".to_string(),
        Some(NodeData::Element(el)) => {
            let mut out = format!("<{}", el.name);
            for key in ["id", "class"] {
                if let Some(v) = doc.attr(id, key).filter(|v| !v.is_empty()) {
                    out.push_str(&format!(" {key}=\"{v}\""));
                }
            }
            out.push('>');
            out
        }
    }
}

/// Head children that carry an external load dependency (`<link href>`, `<script src>`).
pub fn external_resource_url(doc: &Document, id: NodeId) -> Option<&str> {
    match doc.tag_name(id)? {
        "link" => doc.attr(id, "href"),
        "script" => doc.attr(id, "src"),
        _ => None,
    }
    .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_fragment;

    #[test]
    fn pretty_node_name_shows_id_and_class() {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, r#"<button id="save" class="primary" type="submit">x</button>"#);
        let button = doc.first_child(frag).expect("button");
        assert_eq!(
            pretty_node_name(&doc, button),
            r#"<button id="save" class="primary">"#
        );
        assert_eq!(pretty_node_name(&doc, doc.first_child(button).expect("text")), "#text");
    }

    #[test]
    fn external_resources_in_head() {
        let mut doc = Document::new();
        let frag = parse_fragment(
            &mut doc,
            r#"<link rel="stylesheet" href="/a.css"><script src="/b.js"></script><script>inline()</script><meta charset="utf-8">"#,
        );
        let urls: Vec<Option<&str>> = doc
            .children(frag)
            .iter()
            .map(|id| external_resource_url(&doc, *id))
            .collect();
        assert_eq!(urls, [Some("/a.css"), Some("/b.js"), None, None]);
    }
}
