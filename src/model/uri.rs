// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use super::paths::clean_path;

/// Document extensions the preview reacts to. Notifications for anything else are ignored.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mkd", "mkdn", "mdwn"];

/// Identity of an open document, exactly as the editor spelled it.
///
/// The raw string is the registry key; [`DocumentUri::file_path`] gives the normalized
/// filesystem view used for workspace containment and routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentUri {
    value: String,
}

impl DocumentUri {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// Builds a `file://` URI for a filesystem path.
    pub fn from_file_path(path: &Path) -> Self {
        match Url::from_file_path(path) {
            Ok(url) => Self::new(url.to_string()),
            Err(()) => Self::new(format!("file://{}", path.display())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Normalized filesystem path for this document.
    ///
    /// `file://` URIs are percent-decoded; any other value is treated as a plain path.
    pub fn file_path(&self) -> PathBuf {
        if self.value.starts_with("file:") {
            if let Some(path) = Url::parse(&self.value).ok().and_then(|url| url.to_file_path().ok())
            {
                return clean_path(&path);
            }
            let stripped = self.value.trim_start_matches("file://");
            return clean_path(Path::new(stripped));
        }
        clean_path(Path::new(&self.value))
    }

    /// Final path segment, e.g. `notes.md`.
    pub fn file_name(&self) -> String {
        self.file_path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its markdown extension; used as the preview title.
    pub fn title(&self) -> String {
        let path = self.file_path();
        match (path.file_stem(), has_markdown_extension(&path)) {
            (Some(stem), true) => stem.to_string_lossy().into_owned(),
            _ => self.file_name(),
        }
    }

    pub fn is_markdown(&self) -> bool {
        has_markdown_extension(&self.file_path())
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for DocumentUri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for DocumentUri {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for DocumentUri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for DocumentUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub fn has_markdown_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}
