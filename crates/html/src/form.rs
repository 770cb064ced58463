//! Form-control classification and field-set collection.

use crate::document::Document;
use crate::traverse::descendants;
use crate::types::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputControlType {
    Text,
    Checkbox,
    Radio,
    File,
    Submit,
    Other,
}

pub fn input_control_type(doc: &Document, id: NodeId) -> Option<InputControlType> {
    if !doc.is_tag(id, "input") {
        return None;
    }
    let ty = doc
        .attr(id, "type")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    Some(match ty {
        None => InputControlType::Text, // missing type defaults to text
        Some(t) if t.eq_ignore_ascii_case("checkbox") => InputControlType::Checkbox,
        Some(t) if t.eq_ignore_ascii_case("radio") => InputControlType::Radio,
        Some(t) if t.eq_ignore_ascii_case("file") => InputControlType::File,
        Some(t)
            if t.eq_ignore_ascii_case("submit")
                || t.eq_ignore_ascii_case("button")
                || t.eq_ignore_ascii_case("reset")
                || t.eq_ignore_ascii_case("image") =>
        {
            InputControlType::Submit
        }
        Some(t) if t.eq_ignore_ascii_case("text") => InputControlType::Text,
        _ => InputControlType::Other,
    })
}

/// `option` value: its `value` attribute, else its text.
pub fn option_value(doc: &Document, option: NodeId) -> String {
    match doc.attr(option, "value") {
        Some(v) => v.to_string(),
        None => doc.text_content(option).trim().to_string(),
    }
}

pub fn selected_options(doc: &Document, select: NodeId) -> Vec<NodeId> {
    descendants(doc, select)
        .filter(|id| doc.is_tag(*id, "option") && doc.selected(*id))
        .collect()
}

fn is_disabled(doc: &Document, id: NodeId) -> bool {
    if doc.has_attr(id, "disabled") {
        return true;
    }
    // Controls inside a disabled fieldset are disabled too.
    crate::traverse::ancestors(doc, id)
        .any(|a| doc.is_tag(a, "fieldset") && doc.has_attr(a, "disabled"))
}

/// The form's successful controls as ordered name/value pairs.
///
/// Disabled and unnamed controls are skipped, checkboxes and radios only count when checked,
/// and file inputs and buttons are never included.
pub fn form_entries(doc: &Document, form: NodeId) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for id in descendants(doc, form) {
        let Some(tag) = doc.tag_name(id) else {
            continue;
        };
        if !matches!(tag, "input" | "select" | "textarea") {
            continue;
        }
        let Some(name) = doc.attr(id, "name").filter(|n| !n.is_empty()) else {
            continue;
        };
        if is_disabled(doc, id) {
            continue;
        }
        match tag {
            "input" => match input_control_type(doc, id) {
                Some(InputControlType::Checkbox | InputControlType::Radio) => {
                    if doc.checked(id) {
                        let value = doc.attr(id, "value").unwrap_or("on");
                        entries.push((name.to_string(), value.to_string()));
                    }
                }
                Some(InputControlType::File | InputControlType::Submit) => {}
                _ => entries.push((name.to_string(), doc.value(id))),
            },
            "select" => {
                for option in selected_options(doc, id) {
                    entries.push((name.to_string(), option_value(doc, option)));
                }
            }
            _ => entries.push((name.to_string(), doc.value(id))),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_fragment;

    fn form_in(markup: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let frag = parse_fragment(&mut doc, markup);
        let form = doc
            .find_descendant(frag, |d, id| d.is_tag(id, "form"))
            .expect("form element");
        (doc, form)
    }

    #[test]
    fn form_entries_follow_successful_control_rules() {
        let (doc, form) = form_in(
            r#"<form>
                <input name="q" value="rust">
                <input name="skip" value="x" disabled>
                <input type="checkbox" name="a" value="1" checked>
                <input type="checkbox" name="b" value="2">
                <input type="radio" name="r" value="x">
                <input type="radio" name="r" value="y" checked>
                <input type="file" name="f">
                <input type="submit" name="go" value="Go">
                <select name="s"><option>one<option value="2" selected>two</select>
                <textarea name="t">hello</textarea>
                <input value="no-name">
            </form>"#,
        );
        assert_eq!(
            form_entries(&doc, form),
            vec![
                ("q".to_string(), "rust".to_string()),
                ("a".to_string(), "1".to_string()),
                ("r".to_string(), "y".to_string()),
                ("s".to_string(), "2".to_string()),
                ("t".to_string(), "hello".to_string()),
            ]
        );
    }

    #[test]
    fn form_entries_use_live_properties() {
        let (mut doc, form) = form_in(r#"<form><input name="q" value="a"><input type="checkbox" name="c"></form>"#);
        let inputs: Vec<NodeId> = descendants(&doc, form)
            .filter(|id| doc.is_tag(*id, "input"))
            .collect();
        doc.set_value(inputs[0], "typed").expect("set value");
        doc.set_checked(inputs[1], true).expect("check");
        assert_eq!(
            form_entries(&doc, form),
            vec![
                ("q".to_string(), "typed".to_string()),
                ("c".to_string(), "on".to_string()),
            ]
        );
    }

    #[test]
    fn disabled_fieldset_disables_descendants() {
        let (doc, form) = form_in(r#"<form><fieldset disabled><input name="x" value="1"></fieldset></form>"#);
        assert!(form_entries(&doc, form).is_empty());
    }
}
