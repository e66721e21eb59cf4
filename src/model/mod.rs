// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core document types shared by the registry, renderer and preview server.

pub mod document;
pub mod paths;
pub mod uri;

pub use document::{DiagramCacheEntry, DocumentState, Metadata, RenderOutput};
pub use paths::{clean_path, route_to_path, workspace_route};
pub use uri::{has_markdown_extension, DocumentUri, MARKDOWN_EXTENSIONS};
