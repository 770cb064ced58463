//! Structure-preserving reconciliation of a new subtree into a live one.
//!
//! The engine walks both child lists in lockstep, matching nodes first by identity (equal
//! ids, or ids shared beneath them) and then by tag, so that unchanged nodes keep their
//! handle, focus and form state. Nothing is retained between calls: the id index and the
//! dead-id set live for exactly one [`reconcile`].

mod attributes;
mod callbacks;
mod config;
mod engine;
mod error;
mod head;
mod id_map;

pub use attributes::{apply_attributes, settle_attributes};
pub use callbacks::{AttributeUpdate, HeadMergeReport, MorphCallbacks, NoCallbacks};
pub use config::{HeadConfig, HeadStyle, MorphConfig};
pub use engine::MorphStats;
pub use error::MorphError;
pub use head::{PRESERVE_ATTR, RE_APPEND_ATTR};

use engine::Morpher;
use grammar::InsertMode;
use html::{Document, NodeId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MorphOutcome {
    /// Outer mode: the nodes now standing where the old node stood, in order.
    /// Inner mode: the old node's children after the merge.
    pub nodes: Vec<NodeId>,
    /// Head elements added with an external resource still to load.
    pub pending_loads: Vec<NodeId>,
    pub stats: MorphStats,
}

/// Merges the children of `content` into `old`.
///
/// `content` is a container whose children are the new nodes (a fragment, or a response
/// element whose children are wanted). In [`InsertMode::Outer`] the best matching child
/// replaces `old` itself and its siblings are placed around it; in [`InsertMode::Inner`]
/// only the children of `old` are rewritten. New nodes are moved out of `content`.
pub fn reconcile(
    doc: &mut Document,
    old: NodeId,
    content: NodeId,
    mode: InsertMode,
    config: &MorphConfig,
    callbacks: &mut dyn MorphCallbacks,
) -> Result<MorphOutcome, MorphError> {
    if !matches!(mode, InsertMode::Outer | InsertMode::Inner) {
        return Err(MorphError::UnknownSwapMode(mode));
    }
    if mode == InsertMode::Outer && doc.parent(old).is_none() {
        return Err(MorphError::DetachedTarget(old));
    }
    let mut morpher = Morpher::new(doc, old, content, config, callbacks);
    let nodes = match mode {
        InsertMode::Inner => {
            morpher.morph_children(content, old)?;
            morpher.doc.children(old).to_vec()
        }
        _ => morph_outer(&mut morpher, old, content)?,
    };
    log::debug!(
        target: "zjax.morph",
        "{mode} morph of {old}: {:?}",
        morpher.stats
    );
    Ok(MorphOutcome {
        nodes,
        pending_loads: morpher.pending_loads,
        stats: morpher.stats,
    })
}

fn morph_outer(morpher: &mut Morpher<'_>, old: NodeId, content: NodeId) -> Result<Vec<NodeId>, MorphError> {
    let best = morpher.find_best_match(content, old);
    let before: Vec<NodeId> = match best {
        Some(best) => morpher.doc.children(content).iter().copied().take_while(|n| *n != best).collect(),
        None => Vec::new(),
    };
    let after: Vec<NodeId> = match best {
        Some(best) => morpher
            .doc
            .children(content)
            .iter()
            .copied()
            .skip_while(|n| *n != best)
            .skip(1)
            .collect(),
        None => Vec::new(),
    };
    let Some(anchor) = morpher.morph_old_node_to(old, best)? else {
        return Ok(Vec::new());
    };
    let Some(parent) = morpher.doc.parent(anchor) else {
        return Ok(vec![anchor]);
    };
    for node in &before {
        morpher.doc.insert_before(parent, *node, Some(anchor))?;
    }
    let reference = morpher.doc.next_sibling(anchor);
    for node in &after {
        morpher.doc.insert_before(parent, *node, reference)?;
    }
    morpher.stats.nodes_added += before.len() + after.len();
    let mut nodes = before;
    nodes.push(anchor);
    nodes.extend(after);
    Ok(nodes)
}

/// Convenience for callers without hooks.
pub fn reconcile_default(
    doc: &mut Document,
    old: NodeId,
    content: NodeId,
    mode: InsertMode,
    config: &MorphConfig,
) -> Result<MorphOutcome, MorphError> {
    reconcile(doc, old, content, mode, config, &mut NoCallbacks)
}
