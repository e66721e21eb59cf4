// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scroll-anchor selection.
//!
//! Every render of a document produces a snapshot mapping each node's structural key (the
//! child-index path from the root plus the node kind) to the node's own text. The snapshot is
//! compared against the previous one for the same document, and the most specific block that
//! changed gets the anchor id the browser scrolls to.

use std::collections::HashMap;
use std::fmt::Write as _;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::render::{DocTree, NodeId};

/// `id` attribute value the preview script scrolls into view.
pub const SCROLL_ANCHOR_ID: &str = "marksync-scroll-anchor";

/// Structural key (`.0.2:paragraph`) to own text, for one render of one document.
pub type ScrollSnapshot = HashMap<String, String>;

struct SnapshotEntry {
    node: NodeId,
    key: String,
    text: String,
}

/// Per-document snapshot store plus the anchor selection pass.
#[derive(Debug, Default)]
pub struct ScrollAnchorDiffer {
    snapshots: Mutex<HashMap<String, ScrollSnapshot>>,
}

impl ScrollAnchorDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs `tree` against the previous render of `document_key` and marks the anchor.
    ///
    /// Returns the marked node, or `None` when this is the first render of the document or
    /// nothing changed. The stored snapshot is replaced either way.
    pub fn diff(&self, tree: &mut DocTree, document_key: &str) -> Option<NodeId> {
        let entries = snapshot_entries(tree);

        let changed = {
            let mut snapshots = self.snapshots.lock();
            let changed = snapshots.get(document_key).map(|prior| {
                entries
                    .iter()
                    .filter(|entry| prior.get(&entry.key) != Some(&entry.text))
                    .map(|entry| entry.node)
                    .collect::<Vec<_>>()
            });
            let snapshot =
                entries.into_iter().map(|entry| (entry.key, entry.text)).collect::<ScrollSnapshot>();
            snapshots.insert(document_key.to_owned(), snapshot);
            changed
        };

        let anchor = select_anchor(tree, &changed?)?;
        tree.set_attribute(anchor, "id", SCROLL_ANCHOR_ID);
        tracing::debug!(document = document_key, node = anchor, "scroll anchor");
        Some(anchor)
    }

    /// Drops the stored snapshot, so the next render of the document counts as the first.
    pub fn forget(&self, document_key: &str) {
        self.snapshots.lock().remove(document_key);
    }

    pub fn has_snapshot(&self, document_key: &str) -> bool {
        self.snapshots.lock().contains_key(document_key)
    }
}

fn snapshot_entries(tree: &DocTree) -> Vec<SnapshotEntry> {
    let mut entries = Vec::with_capacity(tree.len());
    let mut path = SmallVec::<[usize; 16]>::new();
    collect_entries(tree, DocTree::ROOT, &mut path, &mut entries);
    entries
}

fn collect_entries(
    tree: &DocTree,
    id: NodeId,
    path: &mut SmallVec<[usize; 16]>,
    entries: &mut Vec<SnapshotEntry>,
) {
    entries.push(SnapshotEntry {
        node: id,
        key: structural_key(path, tree, id),
        text: tree.own_text(id),
    });

    for (index, &child) in tree.children(id).iter().enumerate() {
        path.push(index);
        collect_entries(tree, child, path, entries);
        path.pop();
    }
}

fn structural_key(path: &[usize], tree: &DocTree, id: NodeId) -> String {
    let mut key = String::with_capacity(path.len() * 3 + 12);
    for index in path {
        let _ = write!(key, ".{index}");
    }
    key.push(':');
    key.push_str(tree.kind(id).tag());
    key
}

/// Nearest ancestor-or-self that the browser can scroll to.
fn scroll_target(tree: &DocTree, id: NodeId) -> Option<NodeId> {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .find(|&candidate| tree.kind(candidate).is_scroll_target())
}

fn select_anchor(tree: &DocTree, changed: &[NodeId]) -> Option<NodeId> {
    let mut marked = vec![false; tree.len()];
    let mut last_orphan = None;
    for &id in changed {
        match scroll_target(tree, id) {
            Some(target) => marked[target] = true,
            None => last_orphan = last_orphan.max(Some(id)),
        }
    }

    // Arena order is document order, so `>=` lets the later node win a depth tie.
    let mut best: Option<(NodeId, usize)> = None;
    for id in (0..tree.len()).filter(|&id| marked[id]) {
        let depth = tree.depth(id);
        if best.map_or(true, |(_, best_depth)| depth >= best_depth) {
            best = Some((id, depth));
        }
    }
    if let Some((id, _)) = best {
        return Some(id);
    }

    let orphan = last_orphan?;
    (0..orphan).rev().find(|&id| tree.kind(id).is_scroll_target())
}
