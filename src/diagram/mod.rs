// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! PlantUML placeholder resolution with a per-document render cache.
//!
//! Rendered HTML contains diagrams as `<pre><code class="language-plantuml">` blocks. A
//! resolve pass swaps each block for an inline PNG, reusing prior renders where the encoded
//! payload matches and only calling the diagram server on a generating pass.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::model::DiagramCacheEntry;
use crate::render::unescape_html;

mod client;
mod encode;

pub use client::PlantUmlClient;
pub use encode::{encode_diagram, image_markup};

/// Diagrams without this marker are treated as ordinary code.
pub const START_MARKER: &str = "@startuml";

#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("invalid diagram server {server:?}: {source}")]
    Endpoint { server: String, source: url::ParseError },
    #[error("failed to build diagram http client: {source}")]
    Client { source: reqwest::Error },
    #[error("diagram request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("diagram server answered {status} for {url}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("failed to encode diagram source: {source}")]
    Encode { source: std::io::Error },
}

/// Remote diagram renderer.
#[async_trait]
pub trait DiagramFetcher: Send + Sync {
    /// Returns PNG bytes for an encoded payload.
    async fn fetch(&self, payload: &str) -> Result<Vec<u8>, DiagramError>;
}

/// Output of one resolve pass.
#[derive(Debug)]
pub struct DiagramResolution {
    pub html: String,
    pub entries: Vec<DiagramCacheEntry>,
    /// First fetch failure of the pass; the affected blocks keep their placeholder.
    pub error: Option<DiagramError>,
}

#[derive(Clone)]
pub struct DiagramCache {
    fetcher: Arc<dyn DiagramFetcher>,
}

struct Placeholder {
    span: Range<usize>,
    source: String,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<pre><code class="language-plantuml">(.*?)</code></pre>"#)
            .expect("valid placeholder pattern")
    })
}

fn find_placeholders(html: &str) -> Vec<Placeholder> {
    placeholder_pattern()
        .captures_iter(html)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let body = captures.get(1)?;
            Some(Placeholder { span: whole.range(), source: unescape_html(body.as_str()) })
        })
        .collect()
}

impl DiagramCache {
    pub fn new(fetcher: Arc<dyn DiagramFetcher>) -> Self {
        Self { fetcher }
    }

    /// Replaces diagram placeholders in `html`.
    ///
    /// A placeholder whose payload matches a resolved entry in `prior` reuses that markup.
    /// Otherwise a generating pass fetches it, and a non-generating pass reuses whatever the
    /// entry at the same position rendered. Non-generating passes never touch the network
    /// and return `prior` unchanged; generating passes return one entry per diagram.
    pub async fn resolve(
        &self,
        html: &str,
        generate: bool,
        prior: &[DiagramCacheEntry],
    ) -> DiagramResolution {
        let placeholders = find_placeholders(html);
        let mut out = String::with_capacity(html.len());
        let mut entries = Vec::new();
        let mut error = None;
        let mut cursor = 0;
        let mut position = 0;

        for placeholder in placeholders {
            let original = &html[placeholder.span.clone()];
            out.push_str(&html[cursor..placeholder.span.start]);
            cursor = placeholder.span.end;

            if !placeholder.source.contains(START_MARKER) {
                out.push_str(original);
                continue;
            }

            let slot = prior.get(position);
            position += 1;

            let payload = match encode_diagram(&placeholder.source) {
                Ok(payload) => payload,
                Err(source) => {
                    tracing::warn!(error = %source, "failed to encode diagram");
                    error.get_or_insert(DiagramError::Encode { source });
                    out.push_str(original);
                    if generate {
                        entries.extend(slot.cloned());
                    }
                    continue;
                }
            };

            let cached = prior.iter().find(|entry| entry.is_resolved() && entry.payload == payload);
            let markup = match cached {
                Some(entry) => Some(entry.markup.clone()),
                None if generate => match self.fetcher.fetch(&payload).await {
                    Ok(png) => Some(image_markup(&png)),
                    Err(err) => {
                        tracing::warn!(error = %err, "diagram render failed");
                        error.get_or_insert(err);
                        None
                    }
                },
                None => slot.filter(|entry| entry.is_resolved()).map(|entry| entry.markup.clone()),
            };

            out.push_str(markup.as_deref().unwrap_or(original));

            if generate {
                let entry = match markup {
                    Some(markup) => DiagramCacheEntry::new(payload, markup),
                    None => slot.cloned().unwrap_or_else(|| DiagramCacheEntry::unresolved(payload)),
                };
                entries.push(entry);
            }
        }
        out.push_str(&html[cursor..]);

        DiagramResolution {
            html: out,
            entries: if generate { entries } else { prior.to_vec() },
            error,
        }
    }
}
