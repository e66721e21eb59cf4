// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rewrites relative links between workspace documents into routes the preview script can
//! intercept and send back to the editor.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::model::{clean_path, has_markdown_extension, workspace_route, DocumentUri};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolver {
    workspace_root: PathBuf,
}

impl LinkResolver {
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self { workspace_root: clean_path(workspace_root.as_ref()) }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Workspace route (`/docs/a.md#intro`) for a link found in `current`.
    ///
    /// URLs with a scheme and same-page anchors are skipped. Relative paths resolve against
    /// the directory of `current`; a leading `/` resolves against the workspace root. Targets
    /// outside the workspace give `None`.
    pub fn resolve(&self, destination: &str, current: &DocumentUri) -> Option<String> {
        let has_scheme = Url::parse(destination).is_ok();
        if destination.is_empty() || destination.starts_with('#') || has_scheme {
            return None;
        }

        let (path, fragment) = match destination.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (destination, None),
        };
        let path = path.split_once('?').map_or(path, |(path, _query)| path);
        if path.is_empty() {
            return None;
        }
        let path = percent_decode_str(path).decode_utf8().ok()?;

        let target = match path.strip_prefix('/') {
            Some(rooted) => self.workspace_root.join(rooted),
            None => current.file_path().parent()?.join(path.as_ref()),
        };
        let route = workspace_route(&self.workspace_root, &target)?;

        Some(match fragment {
            Some(fragment) => format!("{route}#{fragment}"),
            None => route,
        })
    }

    /// Like [`LinkResolver::resolve`], restricted to targets that are markdown documents.
    pub fn internal_target(&self, destination: &str, current: &DocumentUri) -> Option<String> {
        let route = self.resolve(destination, current)?;
        let path = route.split('#').next().unwrap_or_default();
        has_markdown_extension(Path::new(path)).then_some(route)
    }
}
