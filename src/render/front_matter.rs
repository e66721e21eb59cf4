// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;

use crate::model::Metadata;

use super::html::escape_html;

/// Parses a YAML front-matter block into metadata.
pub fn parse_front_matter(yaml: &str) -> Result<Metadata, serde_yml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }
    serde_yml::from_str::<Option<Metadata>>(yaml).map(Option::unwrap_or_default)
}

/// Renders metadata as the two-column table shown above the preview.
///
/// Returns an empty string when there is nothing to show.
pub fn meta_table_html(metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return String::new();
    }

    let mut html = String::from("<table><tr><th colspan='2'>Meta</th></tr>");
    for (key, value) in metadata {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(key),
            escape_html(&display_value(value))
        );
    }
    html.push_str("</table>");
    html
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Array(items) => {
            items.iter().map(display_value).collect::<Vec<_>>().join(", ")
        }
        other => other.to_string(),
    }
}
