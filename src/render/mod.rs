// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Markdown parsing into a [`DocTree`] and HTML emission.
//!
//! Parsing and HTML output are split so the scroll-anchor differ can mark a node between the
//! two steps. The grammar itself comes from `pulldown-cmark`; this module only maps its event
//! stream onto the arena tree.

use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, LinkType, MetadataBlockKind, Options, Parser, Tag,
};

use regex::{Captures, Regex};

use crate::config::RenderOptions;
use crate::model::{has_markdown_extension, DocumentUri, Metadata};

pub mod front_matter;
pub mod html;
pub mod images;
pub mod tree;

pub use front_matter::{meta_table_html, parse_front_matter};
pub use html::{escape_html, unescape_html, write_html, LinkHook, INTERNAL_LINK_CLASS};
pub use images::{ImageInliner, MAX_INLINE_IMAGE_BYTES};
pub use tree::{CellAlignment, DocTree, Node, NodeId, NodeKind};

/// Result of parsing one markdown source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub tree: DocTree,
    pub metadata: Metadata,
}

/// Turns markdown source into a document tree plus front-matter metadata.
///
/// Implementations must be pure: no state is retained between calls.
pub trait Renderer: Send + Sync {
    fn parse(&self, source: &str, uri: &DocumentUri) -> ParsedDocument;
}

/// [`Renderer`] backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        if self.options.footnotes {
            options |= Options::ENABLE_FOOTNOTES;
        }
        if self.options.wikilinks {
            options |= Options::ENABLE_WIKILINKS;
        }
        options
    }
}

impl Renderer for MarkdownRenderer {
    fn parse(&self, source: &str, uri: &DocumentUri) -> ParsedDocument {
        let tree = build_tree(Parser::new_ext(source, self.parser_options()), self.options.emoji);

        let metadata = match front_matter_source(&tree) {
            Some(yaml) => parse_front_matter(yaml).unwrap_or_else(|err| {
                tracing::warn!(uri = %uri, error = %err, "ignoring invalid front matter");
                Metadata::new()
            }),
            None => Metadata::new(),
        };

        ParsedDocument { tree, metadata }
    }
}

fn front_matter_source(tree: &DocTree) -> Option<&str> {
    tree.children(DocTree::ROOT)
        .iter()
        .find(|&&id| matches!(tree.kind(id), NodeKind::FrontMatter))
        .map(|&id| tree.node(id).literal.as_str())
}

fn build_tree<'a>(events: impl Iterator<Item = Event<'a>>, emoji: bool) -> DocTree {
    let mut tree = DocTree::new();
    let mut stack = vec![DocTree::ROOT];

    for event in events {
        let parent = stack.last().copied().unwrap_or(DocTree::ROOT);
        match event {
            Event::Start(tag) => {
                let id = tree.push(parent, node_kind(tag), "");
                stack.push(id);
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Event::Text(text) => match tree.kind(parent) {
                NodeKind::CodeBlock { .. } | NodeKind::FrontMatter => {
                    tree.append_literal(parent, &text)
                }
                _ if emoji => {
                    tree.push(parent, NodeKind::Text, replace_emoji_shortcodes(&text));
                }
                _ => {
                    tree.push(parent, NodeKind::Text, text.as_ref());
                }
            },
            Event::Html(html) => match tree.kind(parent) {
                NodeKind::HtmlBlock => tree.append_literal(parent, &html),
                _ => {
                    tree.push(parent, NodeKind::HtmlBlock, html.as_ref());
                }
            },
            Event::InlineHtml(html) => {
                tree.push(parent, NodeKind::InlineHtml, html.as_ref());
            }
            Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                tree.push(parent, NodeKind::Code, code.as_ref());
            }
            Event::FootnoteReference(label) => {
                tree.push(parent, NodeKind::FootnoteReference { label: label.to_string() }, "");
            }
            Event::SoftBreak => {
                tree.push(parent, NodeKind::SoftBreak, "");
            }
            Event::HardBreak => {
                tree.push(parent, NodeKind::HardBreak, "");
            }
            Event::Rule => {
                tree.push(parent, NodeKind::Rule, "");
            }
            Event::TaskListMarker(checked) => {
                tree.push(parent, NodeKind::TaskMarker { checked }, "");
            }
        }
    }

    tree
}

fn node_kind(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading(level as u8),
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeKind::CodeBlock {
            language: info.split_whitespace().next().map(str::to_owned),
        },
        Tag::CodeBlock(CodeBlockKind::Indented) => NodeKind::CodeBlock { language: None },
        Tag::HtmlBlock => NodeKind::HtmlBlock,
        Tag::List(start) => NodeKind::List { start },
        Tag::Item => NodeKind::Item,
        Tag::FootnoteDefinition(label) => {
            NodeKind::FootnoteDefinition { label: label.to_string() }
        }
        Tag::Table(alignments) => {
            NodeKind::Table(alignments.into_iter().map(cell_alignment).collect())
        }
        Tag::TableHead => NodeKind::TableHead,
        Tag::TableRow => NodeKind::TableRow,
        Tag::TableCell => NodeKind::TableCell,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Strikethrough,
        Tag::Link { link_type, dest_url, title, .. } => NodeKind::Link {
            destination: link_destination(link_type, &dest_url),
            title: title.to_string(),
        },
        Tag::Image { dest_url, title, .. } => {
            NodeKind::Image { destination: dest_url.to_string(), title: title.to_string() }
        }
        Tag::MetadataBlock(MetadataBlockKind::YamlStyle) => NodeKind::FrontMatter,
        Tag::MetadataBlock(MetadataBlockKind::PlusesStyle) => NodeKind::Block,
        Tag::DefinitionList | Tag::DefinitionListTitle | Tag::DefinitionListDefinition => {
            NodeKind::Block
        }
        _ => NodeKind::Span,
    }
}

/// Wiki links name a page; they point at the markdown file of that name.
fn link_destination(link_type: LinkType, dest_url: &str) -> String {
    if !matches!(link_type, LinkType::WikiLink { .. }) {
        return dest_url.to_owned();
    }
    let (page, fragment) = match dest_url.split_once('#') {
        Some((page, fragment)) => (page, Some(fragment)),
        None => (dest_url, None),
    };
    if page.is_empty() || has_markdown_extension(Path::new(page)) {
        return dest_url.to_owned();
    }
    match fragment {
        Some(fragment) => format!("{page}.md#{fragment}"),
        None => format!("{page}.md"),
    }
}

fn shortcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r":([a-z0-9_+-]+):").expect("valid shortcode regex"))
}

/// Replaces `:name:` shortcodes with the emoji they name; unknown names stay as typed.
fn replace_emoji_shortcodes(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }
    shortcode_pattern().replace_all(text, |caps: &Captures<'_>| {
        match emojis::get_by_shortcode(&caps[1]) {
            Some(emoji) => emoji.as_str().to_owned(),
            None => caps[0].to_owned(),
        }
    })
}

fn cell_alignment(alignment: Alignment) -> CellAlignment {
    match alignment {
        Alignment::None => CellAlignment::None,
        Alignment::Left => CellAlignment::Left,
        Alignment::Center => CellAlignment::Center,
        Alignment::Right => CellAlignment::Right,
    }
}

#[cfg(test)]
mod tests;
