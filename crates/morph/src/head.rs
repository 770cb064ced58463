//! `<head>` reconciliation: children are matched by their serialized markup, not by position.

use crate::callbacks::HeadMergeReport;
use crate::config::HeadStyle;
use crate::engine::Morpher;
use crate::error::MorphError;
use html::dom_utils::external_resource_url;
use html::parse_fragment;
use html::serialize::outer_html;
use html::NodeId;

pub const PRESERVE_ATTR: &str = "z-preserve";
pub const RE_APPEND_ATTR: &str = "z-re-append";

impl Morpher<'_> {
    fn flag(&self, node: NodeId, attr: &str) -> bool {
        self.doc.attr(node, attr) == Some("true")
    }

    /// Merges `new_head` into `old_head`. Added elements that load an external resource are
    /// queued on `pending_loads`.
    pub(crate) fn merge_head(&mut self, new_head: NodeId, old_head: NodeId) -> Result<(), MorphError> {
        let style = self.config.head.style;
        let mut wanted: Vec<(String, NodeId)> = self
            .doc
            .element_children(new_head)
            .map(|n| (outer_html(self.doc, n), n))
            .collect();

        let mut report = HeadMergeReport::default();
        let mut to_remove = Vec::new();
        let mut to_append = Vec::new();
        let old_children: Vec<NodeId> = self.doc.element_children(old_head).collect();
        for old in old_children {
            let markup = outer_html(self.doc, old);
            let position = wanted.iter().position(|(m, _)| *m == markup);
            let re_append = self.flag(old, RE_APPEND_ATTR);
            if position.is_some() || self.flag(old, PRESERVE_ATTR) {
                if re_append {
                    to_remove.push(old);
                } else {
                    if let Some(pos) = position {
                        wanted.remove(pos);
                    }
                    report.kept.push(old);
                }
            } else if style == HeadStyle::Append {
                if re_append {
                    to_remove.push(old);
                    to_append.push(markup);
                }
            } else if self.callbacks.should_remove_head_child(self.doc, old) {
                to_remove.push(old);
            }
        }
        to_append.extend(wanted.into_iter().map(|(markup, _)| markup));

        for markup in to_append {
            let holder = parse_fragment(self.doc, &markup);
            let Some(node) = self.doc.first_child(holder) else {
                continue;
            };
            if !self.callbacks.before_node_added(self.doc, node) {
                self.doc.purge(holder);
                continue;
            }
            if external_resource_url(self.doc, node).is_some() {
                self.pending_loads.push(node);
            }
            self.doc.append_child(old_head, node)?;
            self.doc.purge(holder);
            self.stats.nodes_added += 1;
            self.callbacks.after_node_added(self.doc, node);
            report.added.push(node);
        }

        for old in to_remove {
            if self.callbacks.before_node_removed(self.doc, old) {
                self.doc.remove(old)?;
                self.stats.nodes_removed += 1;
                self.callbacks.after_node_removed(self.doc, old);
                report.removed.push(old);
            }
        }
        log::debug!(
            target: "zjax.morph",
            "head merged: {} added, {} kept, {} removed",
            report.added.len(),
            report.kept.len(),
            report.removed.len()
        );
        self.callbacks.after_head_morphed(self.doc, old_head, &report);
        Ok(())
    }
}
