// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::model::DocumentUri;

use super::{EditorClient, EditorError};

pub const SHOW_DOCUMENT_METHOD: &str = "window/showDocument";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDocumentParams {
    pub uri: DocumentUri,
    pub take_focus: bool,
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowDocumentRequest {
    pub method: String,
    pub params: ShowDocumentParams,
}

/// [`EditorClient`] that writes one JSON request per line to `W`.
///
/// The writer is shared behind an async mutex so concurrent requests never interleave
/// within a line. Delivery is fire-and-forget: a successful write counts as success.
#[derive(Debug)]
pub struct JsonLinesEditor<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesEditor<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> EditorClient for JsonLinesEditor<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn show_document(
        &self,
        uri: &DocumentUri,
        take_focus: bool,
    ) -> Result<bool, EditorError> {
        let request = ShowDocumentRequest {
            method: SHOW_DOCUMENT_METHOD.to_owned(),
            params: ShowDocumentParams { uri: uri.clone(), take_focus, external: false },
        };
        let mut line =
            serde_json::to_vec(&request).map_err(|source| EditorError::Encode { source })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await.map_err(|source| EditorError::Io { source })?;
        writer.flush().await.map_err(|source| EditorError::Io { source })?;
        Ok(true)
    }
}
