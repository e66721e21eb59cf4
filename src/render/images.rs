// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Local images embedded as `data:` URIs.
//!
//! The preview server only serves its own page, so an image referenced by a relative path
//! would never load. Relative destinations are resolved against the document's directory
//! and replaced with the file's bytes, as long as the file stays inside the document's
//! directory or the workspace and is a known image type below the size cap.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::percent_decode_str;
use url::Url;

use super::tree::{DocTree, NodeKind};
use crate::model::clean_path;

/// Largest file that is embedded; bigger images keep their original destination.
pub const MAX_INLINE_IMAGE_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ImageInliner {
    workspace_root: PathBuf,
    max_bytes: u64,
}

impl ImageInliner {
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self { workspace_root: clean_path(workspace_root.as_ref()), max_bytes: MAX_INLINE_IMAGE_BYTES }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Rewrites every embeddable image in `tree`. Returns how many were embedded.
    pub fn inline(&self, tree: &mut DocTree, document_path: &Path) -> usize {
        let document_dir = document_path.parent().map(clean_path).unwrap_or_default();
        let mut inlined = 0;

        for id in 0..tree.len() {
            let NodeKind::Image { destination, .. } = tree.kind(id) else {
                continue;
            };
            let Some(path) = self.resolve(destination, &document_dir) else {
                continue;
            };
            if let Some(data_uri) = self.data_uri(&path) {
                tree.set_image_destination(id, data_uri);
                inlined += 1;
            }
        }
        inlined
    }

    fn resolve(&self, destination: &str, document_dir: &Path) -> Option<PathBuf> {
        if destination.is_empty()
            || destination.starts_with('#')
            || destination.starts_with("//")
            || Url::parse(destination).is_ok()
        {
            return None;
        }
        let without_suffix = destination.split(['?', '#']).next().unwrap_or(destination);
        let decoded = percent_decode_str(without_suffix).decode_utf8_lossy();

        let path = match decoded.strip_prefix('/') {
            Some(from_root) => clean_path(&self.workspace_root.join(from_root)),
            None => clean_path(&document_dir.join(decoded.as_ref())),
        };
        let allowed = path.starts_with(document_dir) || path.starts_with(&self.workspace_root);
        if !allowed {
            tracing::debug!(path = %path.display(), "image outside the workspace is not embedded");
            return None;
        }
        Some(path)
    }

    fn data_uri(&self, path: &Path) -> Option<String> {
        let mime = image_mime(path)?;
        let size = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "image not readable");
                return None;
            }
        };
        if size > self.max_bytes {
            tracing::debug!(path = %path.display(), size, "image too large to embed");
            return None;
        }
        match std::fs::read(path) {
            Ok(bytes) => Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes))),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read image");
                None
            }
        }
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}
