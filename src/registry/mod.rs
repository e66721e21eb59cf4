// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Authoritative state of every open document.
//!
//! The registry is the only place document text lives. Every method takes the lock for its
//! own duration and hands out clones, so callers can render or fetch diagrams without
//! holding it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;
use percent_encoding::percent_decode_str;

use crate::editor::{apply_change, ContentChange};
use crate::model::{
    clean_path, route_to_path, workspace_route, DocumentState, DocumentUri, RenderOutput,
};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Reads a document's text from disk.
pub fn load_document(uri: &DocumentUri) -> Result<String, DocumentError> {
    let path = uri.file_path();
    std::fs::read_to_string(&path).map_err(|source| DocumentError::Io { path, source })
}

#[derive(Debug)]
pub struct DocumentRegistry {
    workspace_root: PathBuf,
    docs: RwLock<HashMap<DocumentUri, DocumentState>>,
    generation: AtomicU64,
    first_preview_shown: AtomicBool,
}

impl DocumentRegistry {
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            workspace_root: clean_path(workspace_root.as_ref()),
            docs: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            first_preview_shown: AtomicBool::new(false),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn touch(&self, state: &mut DocumentState) {
        state.generation = self.next_generation();
        state.last_modified = SystemTime::now();
    }

    fn touch_content(&self, state: &mut DocumentState) {
        self.touch(state);
        state.revision = state.generation;
    }

    /// Inserts or replaces the state for `uri`.
    pub fn register(&self, uri: DocumentUri, mut state: DocumentState) {
        state.uri = uri.clone();
        self.touch_content(&mut state);
        self.docs.write().insert(uri, state);
    }

    pub fn get(&self, uri: &DocumentUri) -> Option<DocumentState> {
        self.docs.read().get(uri).cloned()
    }

    pub fn contains(&self, uri: &DocumentUri) -> bool {
        self.docs.read().contains_key(uri)
    }

    /// Replaces the text of a known document. Returns `false` for unknown documents.
    pub fn update_content(&self, uri: &DocumentUri, text: impl Into<String>) -> bool {
        let mut docs = self.docs.write();
        let Some(state) = docs.get_mut(uri) else {
            return false;
        };
        state.content = text.into();
        self.touch_content(state);
        true
    }

    /// Applies editor changes in order and returns the resulting text.
    pub fn apply_changes(&self, uri: &DocumentUri, changes: &[ContentChange]) -> Option<String> {
        let mut docs = self.docs.write();
        let state = docs.get_mut(uri)?;
        for change in changes {
            apply_change(&mut state.content, change);
        }
        self.touch_content(state);
        Some(state.content.clone())
    }

    /// Stores the output of a render pass built from the text at `revision`.
    ///
    /// Returns `false` if the document was closed or its text changed meanwhile; the
    /// output is dropped in both cases.
    pub fn store_render(&self, uri: &DocumentUri, revision: u64, output: RenderOutput) -> bool {
        let mut docs = self.docs.write();
        let Some(state) = docs.get_mut(uri) else {
            return false;
        };
        if state.revision != revision {
            tracing::debug!(%uri, revision, current = state.revision, "dropping stale render");
            return false;
        }
        state.apply_render(output);
        self.touch(state);
        true
    }

    pub fn remove(&self, uri: &DocumentUri) -> Option<DocumentState> {
        self.docs.write().remove(uri)
    }

    /// The document that changed last.
    pub fn most_recent(&self) -> Option<DocumentState> {
        self.docs.read().values().max_by_key(|state| state.generation).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Workspace route of a document, or `None` when it lies outside the workspace.
    pub fn relative_path(&self, uri: &DocumentUri) -> Option<String> {
        workspace_route(&self.workspace_root, &uri.file_path())
    }

    /// Document identity for a workspace route.
    ///
    /// An open document whose path matches wins, so in-memory edits stay visible; otherwise
    /// a `file://` URI is built from the workspace root.
    pub fn resolve_uri(&self, route: &str) -> DocumentUri {
        let route = percent_decode_str(route).decode_utf8_lossy();
        let path = route_to_path(&self.workspace_root, &route);

        let open = self.docs.read().keys().find(|uri| uri.file_path() == path).cloned();
        open.unwrap_or_else(|| DocumentUri::from_file_path(&path))
    }

    pub fn mark_first_preview_shown(&self) {
        self.first_preview_shown.store(true, Ordering::Relaxed);
    }

    pub fn first_preview_shown(&self) -> bool {
        self.first_preview_shown.load(Ordering::Relaxed)
    }
}
