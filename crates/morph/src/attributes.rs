//! Attribute, text and form-control synchronisation for a matched node pair.

use crate::callbacks::AttributeUpdate;
use crate::engine::Morpher;
use crate::error::MorphError;
use html::form::{InputControlType, input_control_type};
use html::{Attribute, Document, DomError, NodeData, NodeId};

impl Morpher<'_> {
    fn ignore_attribute(&mut self, name: &str, node: NodeId, update: AttributeUpdate) -> bool {
        if self.config.is_preserved(name) {
            return true;
        }
        if name == "value" && self.ignore_value_of_active(node) {
            return true;
        }
        !self
            .callbacks
            .before_attribute_updated(self.doc, node, name, update)
    }

    /// Copies attributes (or text) from `from` onto `to`, then form-control state.
    pub(crate) fn sync_node_from(&mut self, from: NodeId, to: NodeId) -> Result<(), MorphError> {
        match self.doc.data(from) {
            Some(NodeData::Element(_)) => {
                let wanted = self.doc.attributes(from).to_vec();
                for attr in &wanted {
                    if self.ignore_attribute(&attr.name, to, AttributeUpdate::Update) {
                        continue;
                    }
                    if self.doc.attr(to, &attr.name) != Some(attr.value.as_str()) {
                        self.doc.set_attr(to, &attr.name, &attr.value)?;
                        self.stats.attributes_changed += 1;
                    }
                }
                let existing: Vec<String> = self
                    .doc
                    .attributes(to)
                    .iter()
                    .rev()
                    .map(|a| a.name.clone())
                    .collect();
                for name in existing {
                    if self.ignore_attribute(&name, to, AttributeUpdate::Remove) {
                        continue;
                    }
                    if !self.doc.has_attr(from, &name) {
                        self.doc.remove_attr(to, &name)?;
                        self.stats.attributes_changed += 1;
                    }
                }
            }
            Some(NodeData::Text(text) | NodeData::Comment(text)) => {
                if self.doc.node_value(to) != Some(text.as_str()) {
                    let text = text.clone();
                    self.doc.set_node_value(to, &text)?;
                    self.stats.attributes_changed += 1;
                }
            }
            _ => {}
        }
        if !self.ignore_value_of_active(to) {
            self.sync_input_value(from, to)?;
        }
        Ok(())
    }

    /// Mirrors a boolean property and its content attribute.
    fn sync_boolean(
        &mut self,
        from: NodeId,
        to: NodeId,
        name: &str,
        read: fn(&Document, NodeId) -> bool,
        write: fn(&mut Document, NodeId, bool) -> Result<(), DomError>,
    ) -> Result<(), MorphError> {
        let wanted = read(self.doc, from);
        if wanted == read(self.doc, to) {
            return Ok(());
        }
        let vetoed = self.ignore_attribute(name, to, AttributeUpdate::Update);
        if !vetoed {
            write(self.doc, to, wanted)?;
            self.stats.attributes_changed += 1;
        }
        if wanted {
            if !vetoed {
                self.doc.set_attr(to, name, "")?;
            }
        } else if !self.ignore_attribute(name, to, AttributeUpdate::Remove) {
            self.doc.remove_attr(to, name)?;
        }
        Ok(())
    }

    fn sync_input_value(&mut self, from: NodeId, to: NodeId) -> Result<(), MorphError> {
        let from_tag = self.doc.tag_name(from).unwrap_or_default().to_string();
        if from_tag != self.doc.tag_name(to).unwrap_or_default() {
            return Ok(());
        }
        match from_tag.as_str() {
            "input" if input_control_type(self.doc, from) != Some(InputControlType::File) => {
                self.sync_boolean(from, to, "checked", Document::checked, Document::set_checked)?;
                self.sync_boolean(from, to, "disabled", has_disabled, set_disabled)?;
                if !self.doc.has_attr(from, "value") {
                    if !self.ignore_attribute("value", to, AttributeUpdate::Remove) {
                        if !self.doc.value(to).is_empty() {
                            self.stats.attributes_changed += 1;
                        }
                        self.doc.set_value(to, "")?;
                        self.doc.remove_attr(to, "value")?;
                    }
                } else {
                    let wanted = self.doc.value(from);
                    if wanted != self.doc.value(to)
                        && !self.ignore_attribute("value", to, AttributeUpdate::Update)
                    {
                        self.doc.set_attr(to, "value", &wanted)?;
                        self.doc.set_value(to, &wanted)?;
                        self.stats.attributes_changed += 1;
                    }
                }
            }
            "option" => {
                self.sync_boolean(from, to, "selected", Document::selected, Document::set_selected)?;
            }
            "textarea" => {
                if self.ignore_attribute("value", to, AttributeUpdate::Update) {
                    return Ok(());
                }
                let wanted = self.doc.value(from);
                if wanted != self.doc.value(to) {
                    self.doc.set_value(to, &wanted)?;
                    self.stats.attributes_changed += 1;
                }
                if let Some(first) = self.doc.first_child(to)
                    && self.doc.node_value(first).is_some_and(|v| v != wanted)
                {
                    self.doc.set_node_value(first, &wanted)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn has_disabled(doc: &Document, id: NodeId) -> bool {
    doc.has_attr(id, "disabled")
}

fn set_disabled(doc: &mut Document, id: NodeId, disabled: bool) -> Result<(), DomError> {
    if disabled {
        doc.set_attr(id, "disabled", "")
    } else {
        doc.remove_attr(id, "disabled").map(|_| ())
    }
}

/// Attributes of `node` that settle would carry over, skipping `exempt` names.
pub fn settle_attributes(doc: &Document, node: NodeId, exempt: &[String]) -> Vec<Attribute> {
    doc.attributes(node)
        .iter()
        .filter(|a| !exempt.iter().any(|e| e.eq_ignore_ascii_case(&a.name)))
        .cloned()
        .collect()
}

/// Replaces every non-exempt attribute of `node` with `attributes`.
pub fn apply_attributes(
    doc: &mut Document,
    node: NodeId,
    attributes: &[Attribute],
    exempt: &[String],
) -> Result<(), DomError> {
    let is_exempt = |name: &str| exempt.iter().any(|e| e.eq_ignore_ascii_case(name));
    let mut next: Vec<Attribute> = doc
        .attributes(node)
        .iter()
        .filter(|a| is_exempt(&a.name))
        .cloned()
        .collect();
    for attr in attributes.iter().filter(|a| !is_exempt(&a.name)) {
        match next.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => existing.value = attr.value.clone(),
            None => next.push(attr.clone()),
        }
    }
    doc.replace_attributes(node, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::parse_fragment;

    #[test]
    fn apply_attributes_keeps_exempt_names() {
        let mut doc = Document::new();
        let root = parse_fragment(
            &mut doc,
            r#"<div id="card" class="old" z-swap="/x #card" data-k="1"></div>"#,
        );
        let card = doc.first_child(root).expect("card");
        let exempt = vec!["id".to_string(), "z-swap".to_string()];
        apply_attributes(
            &mut doc,
            card,
            &[Attribute::new("class", "new"), Attribute::new("id", "other")],
            &exempt,
        )
        .expect("apply");
        assert_eq!(doc.attr(card, "id"), Some("card"));
        assert_eq!(doc.attr(card, "class"), Some("new"));
        assert_eq!(doc.attr(card, "z-swap"), Some("/x #card"));
        assert!(!doc.has_attr(card, "data-k"));

        let carried = settle_attributes(&doc, card, &exempt);
        assert_eq!(carried, vec![Attribute::new("class", "new")]);
    }
}
