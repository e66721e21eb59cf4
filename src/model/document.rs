// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::time::SystemTime;

use super::uri::DocumentUri;

/// Front-matter values keyed by name, ordered by key.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A rendered PlantUML diagram, keyed by its encoded payload.
///
/// An entry whose fetch failed keeps its payload but has empty markup; it holds the
/// positional slot without ever counting as a cache hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramCacheEntry {
    pub payload: String,
    pub markup: String,
}

impl DiagramCacheEntry {
    pub fn new(payload: impl Into<String>, markup: impl Into<String>) -> Self {
        Self { payload: payload.into(), markup: markup.into() }
    }

    pub fn unresolved(payload: impl Into<String>) -> Self {
        Self { payload: payload.into(), markup: String::new() }
    }

    pub fn is_resolved(&self) -> bool {
        !self.markup.is_empty()
    }
}

/// Everything a render pass produces for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
    pub html: String,
    pub metadata: Metadata,
    pub diagrams: Vec<DiagramCacheEntry>,
}

/// Authoritative state of one open document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    pub uri: DocumentUri,
    pub content: String,
    pub rendered_html: String,
    pub metadata: Metadata,
    pub diagrams: Vec<DiagramCacheEntry>,
    pub last_modified: SystemTime,
    /// Registry-wide mutation counter at the time of the last change.
    pub generation: u64,
    /// Generation of the last change to `content`. A render is stored only against the
    /// revision it was built from.
    pub revision: u64,
}

impl DocumentState {
    pub fn new(uri: DocumentUri, content: impl Into<String>) -> Self {
        Self {
            uri,
            content: content.into(),
            rendered_html: String::new(),
            metadata: Metadata::new(),
            diagrams: Vec::new(),
            last_modified: SystemTime::now(),
            generation: 0,
            revision: 0,
        }
    }

    pub fn with_render(mut self, output: RenderOutput) -> Self {
        self.apply_render(output);
        self
    }

    pub fn apply_render(&mut self, output: RenderOutput) {
        self.rendered_html = output.html;
        self.metadata = output.metadata;
        self.diagrams = output.diagrams;
    }

    pub fn is_rendered(&self) -> bool {
        !self.rendered_html.is_empty()
    }
}
