// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor-facing surface: the notifications we consume and the requests we send back.
//!
//! Positions follow the editor protocol convention: zero-based lines, and columns counted
//! in UTF-16 code units.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::DocumentUri;

mod stdio;

pub use stdio::{JsonLinesEditor, ShowDocumentParams, ShowDocumentRequest};

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("failed to write editor request: {source}")]
    Io { source: std::io::Error },
    #[error("failed to encode editor request: {source}")]
    Encode { source: serde_json::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// One edit. Without a range the text replaces the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    pub text: String,
}

impl ContentChange {
    pub fn full(text: impl Into<String>) -> Self {
        Self { range: None, text: text.into() }
    }

    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self { range: Some(range), text: text.into() }
    }
}

/// Notifications read from the editor, one JSON object per line:
/// `{"method":"didOpen","params":{"uri":"file:///ws/a.md","text":"# A"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum EditorNotification {
    DidOpen {
        uri: DocumentUri,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    DidChange {
        uri: DocumentUri,
        content_changes: Vec<ContentChange>,
    },
    DidSave {
        uri: DocumentUri,
        #[serde(default)]
        text: Option<String>,
    },
    DidClose {
        uri: DocumentUri,
    },
    DidChangeFocus {
        uri: DocumentUri,
    },
    ExecuteCommand {
        command: String,
    },
}

/// Requests the preview sends to the editor.
#[async_trait]
pub trait EditorClient: Send + Sync {
    /// Asks the editor to reveal `uri`. Returns whether the editor reported success.
    async fn show_document(&self, uri: &DocumentUri, take_focus: bool)
        -> Result<bool, EditorError>;
}

/// Applies one change to `text` in place.
pub fn apply_change(text: &mut String, change: &ContentChange) {
    let Some(range) = change.range else {
        text.clone_from(&change.text);
        return;
    };

    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end);
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    text.replace_range(start..end, &change.text);
}

/// Byte offset of `position`, clamped to the end of its line (or of the text).
fn byte_offset(text: &str, position: Position) -> usize {
    let mut line_start = 0;
    for _ in 0..position.line {
        match text[line_start..].find('\n') {
            Some(newline) => line_start += newline + 1,
            None => return text.len(),
        }
    }

    let line_end = text[line_start..].find('\n').map_or(text.len(), |newline| line_start + newline);
    let mut units = 0u32;
    for (index, ch) in text[line_start..line_end].char_indices() {
        if units >= position.character {
            return line_start + index;
        }
        units += ch.len_utf16() as u32;
    }
    line_end
}
