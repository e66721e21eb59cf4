// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTML emission for a [`DocTree`].
//!
//! Raw HTML from the source is passed through untouched. Fenced code blocks are written as
//! `<pre><code class="language-…">`, which is the placeholder shape the diagram cache
//! scans for.

use super::tree::{CellAlignment, DocTree, NodeId, NodeKind};

/// Class attached to links the browser should route back through the editor.
pub const INTERNAL_LINK_CLASS: &str = "internal-link";

/// Maps a link destination to a workspace route when the link should be intercepted.
pub type LinkHook<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_html`], plus decimal/hex numeric references.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';').filter(|&end| end <= 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let entity = &tail[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// Writes the whole tree as an HTML fragment.
pub fn write_html(tree: &DocTree, links: LinkHook<'_>) -> String {
    let mut writer = HtmlWriter { tree, links, out: String::new() };
    writer.children(DocTree::ROOT);
    writer.out
}

struct HtmlWriter<'a> {
    tree: &'a DocTree,
    links: LinkHook<'a>,
    out: String,
}

impl HtmlWriter<'_> {
    fn children(&mut self, id: NodeId) {
        for &child in self.tree.children(id) {
            self.node(child);
        }
    }

    fn attributes(&mut self, id: NodeId) {
        for (name, value) in &self.tree.node(id).attributes {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape_html(value));
            self.out.push('"');
        }
    }

    fn open(&mut self, tag: &str, id: NodeId) {
        self.out.push('<');
        self.out.push_str(tag);
        self.attributes(id);
        self.out.push('>');
    }

    fn wrap(&mut self, tag: &str, id: NodeId) {
        self.open(tag, id);
        self.children(id);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn node(&mut self, id: NodeId) {
        let node = self.tree.node(id);
        match &node.kind {
            NodeKind::Document | NodeKind::Block | NodeKind::Span => self.children(id),
            NodeKind::FrontMatter => {}
            NodeKind::Heading(level) => {
                self.wrap(&format!("h{level}"), id);
                self.out.push('\n');
            }
            NodeKind::Paragraph => {
                self.wrap("p", id);
                self.out.push('\n');
            }
            NodeKind::BlockQuote => {
                self.open("blockquote", id);
                self.out.push('\n');
                self.children(id);
                self.out.push_str("</blockquote>\n");
            }
            NodeKind::List { start } => {
                let tag = match start {
                    Some(1) => "ol".to_owned(),
                    Some(start) => format!("ol start=\"{start}\""),
                    None => "ul".to_owned(),
                };
                self.open(&tag, id);
                self.out.push('\n');
                self.children(id);
                self.out.push_str(if start.is_some() { "</ol>\n" } else { "</ul>\n" });
            }
            NodeKind::Item => {
                self.wrap("li", id);
                self.out.push('\n');
            }
            NodeKind::CodeBlock { language } => {
                self.out.push_str("<pre");
                self.attributes(id);
                self.out.push_str("><code");
                if let Some(language) = language {
                    self.out.push_str(" class=\"language-");
                    self.out.push_str(&escape_html(language));
                    self.out.push('"');
                }
                self.out.push('>');
                self.out.push_str(&escape_html(&node.literal));
                self.out.push_str("</code></pre>\n");
            }
            NodeKind::HtmlBlock | NodeKind::InlineHtml => self.out.push_str(&node.literal),
            NodeKind::Rule => self.out.push_str("<hr />\n"),
            NodeKind::Table(_) => {
                self.open("table", id);
                self.children(id);
                self.out.push_str("</tbody></table>\n");
            }
            NodeKind::TableHead => {
                self.out.push_str("<thead><tr>");
                self.children(id);
                self.out.push_str("</tr></thead><tbody>\n");
            }
            NodeKind::TableRow => {
                self.out.push_str("<tr>");
                self.children(id);
                self.out.push_str("</tr>\n");
            }
            NodeKind::TableCell => self.table_cell(id),
            NodeKind::FootnoteDefinition { label } => {
                let label = escape_html(label);
                self.out.push_str(&format!(
                    "<div class=\"footnote-definition\" id=\"fn-{label}\"><sup class=\"footnote-definition-label\">{label}</sup>"
                ));
                self.children(id);
                self.out.push_str("</div>\n");
            }
            NodeKind::Text => self.out.push_str(&escape_html(&node.literal)),
            NodeKind::Code => {
                self.out.push_str("<code>");
                self.out.push_str(&escape_html(&node.literal));
                self.out.push_str("</code>");
            }
            NodeKind::SoftBreak => self.out.push('\n'),
            NodeKind::HardBreak => self.out.push_str("<br />\n"),
            NodeKind::Emphasis => self.wrap("em", id),
            NodeKind::Strong => self.wrap("strong", id),
            NodeKind::Strikethrough => self.wrap("del", id),
            NodeKind::Link { destination, title } => self.link(id, destination, title),
            NodeKind::Image { destination, title } => {
                self.out.push_str("<img src=\"");
                self.out.push_str(&escape_html(destination));
                self.out.push_str("\" alt=\"");
                self.out.push_str(&escape_html(&self.tree.plain_text(id)));
                self.out.push('"');
                if !title.is_empty() {
                    self.out.push_str(" title=\"");
                    self.out.push_str(&escape_html(title));
                    self.out.push('"');
                }
                self.attributes(id);
                self.out.push_str(" />");
            }
            NodeKind::FootnoteReference { label } => {
                let label = escape_html(label);
                self.out.push_str(&format!(
                    "<sup class=\"footnote-reference\"><a href=\"#fn-{label}\">{label}</a></sup>"
                ));
            }
            NodeKind::TaskMarker { checked } => {
                self.out.push_str("<input disabled=\"\" type=\"checkbox\"");
                if *checked {
                    self.out.push_str(" checked=\"\"");
                }
                self.out.push_str("/>\n");
            }
        }
    }

    fn link(&mut self, id: NodeId, destination: &str, title: &str) {
        self.out.push_str("<a href=\"");
        self.out.push_str(&escape_html(destination));
        self.out.push('"');
        if !title.is_empty() {
            self.out.push_str(" title=\"");
            self.out.push_str(&escape_html(title));
            self.out.push('"');
        }
        if let Some(route) = (self.links)(destination) {
            self.out.push_str(" class=\"");
            self.out.push_str(INTERNAL_LINK_CLASS);
            self.out.push_str("\" data-target=\"");
            self.out.push_str(&escape_html(&route));
            self.out.push('"');
        }
        self.attributes(id);
        self.out.push('>');
        self.children(id);
        self.out.push_str("</a>");
    }

    fn table_cell(&mut self, id: NodeId) {
        let in_head = self
            .tree
            .parent(id)
            .is_some_and(|parent| matches!(self.tree.kind(parent), NodeKind::TableHead));
        let tag = if in_head { "th" } else { "td" };

        let alignment = self.cell_alignment(id);
        self.out.push('<');
        self.out.push_str(tag);
        match alignment {
            CellAlignment::None => {}
            CellAlignment::Left => self.out.push_str(" style=\"text-align: left\""),
            CellAlignment::Center => self.out.push_str(" style=\"text-align: center\""),
            CellAlignment::Right => self.out.push_str(" style=\"text-align: right\""),
        }
        self.attributes(id);
        self.out.push('>');
        self.children(id);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn cell_alignment(&self, id: NodeId) -> CellAlignment {
        let Some(row) = self.tree.parent(id) else {
            return CellAlignment::None;
        };
        let column = self.tree.children(row).iter().position(|&cell| cell == id).unwrap_or(0);
        self.tree
            .ancestors(row)
            .find_map(|ancestor| match self.tree.kind(ancestor) {
                NodeKind::Table(alignments) => Some(alignments.get(column).copied()),
                _ => None,
            })
            .flatten()
            .unwrap_or(CellAlignment::None)
    }
}
