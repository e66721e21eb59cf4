// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! JSON messages exchanged with the preview page.

use serde::{Deserialize, Serialize};

/// Server to browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PreviewEvent {
    /// First message on every connection.
    #[serde(rename_all = "camelCase")]
    Config { enable_tabs: bool },
    /// New content for a document. An empty route means "whatever page is showing".
    #[serde(rename_all = "camelCase")]
    Update {
        html: String,
        title: String,
        #[serde(rename = "metaTableHTML")]
        meta_table_html: String,
        document_route: String,
    },
    #[serde(rename_all = "camelCase")]
    CloseDocument { document_route: String, is_last_document: bool },
}

/// Browser to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// A click on an internal link. `uri` is the link's workspace route.
    #[serde(rename_all = "camelCase")]
    OpenDocument {
        uri: String,
        #[serde(default)]
        take_focus: bool,
        #[serde(default)]
        update_preview: bool,
    },
    /// A freshly loaded tab asking for the current content of its route.
    #[serde(rename_all = "camelCase")]
    SyncDocument { document_route: String },
}

/// What the hub hands to the editor-facing side. Routes are resolved to documents there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    OpenDocument { route: String, take_focus: bool, refresh_preview: bool },
    SyncDocument { route: String },
}

impl From<ClientMessage> for ClientRequest {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::OpenDocument { uri, take_focus, update_preview } => {
                Self::OpenDocument { route: uri, take_focus, refresh_preview: update_preview }
            }
            ClientMessage::SyncDocument { document_route } => {
                Self::SyncDocument { route: document_route }
            }
        }
    }
}
