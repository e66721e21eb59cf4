// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arena representation of a parsed markdown document.
//!
//! Nodes are appended in the order their start events arrive, so a node's arena index is
//! also its position in a pre-order (document order) walk. The root is always node `0`.

/// Index of a node inside a [`DocTree`].
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlignment {
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    FrontMatter,
    Heading(u8),
    Paragraph,
    BlockQuote,
    List { start: Option<u64> },
    Item,
    CodeBlock { language: Option<String> },
    HtmlBlock,
    Rule,
    Table(Vec<CellAlignment>),
    TableHead,
    TableRow,
    TableCell,
    FootnoteDefinition { label: String },
    /// Block container we render transparently.
    Block,
    Text,
    Code,
    InlineHtml,
    SoftBreak,
    HardBreak,
    Emphasis,
    Strong,
    Strikethrough,
    Link { destination: String, title: String },
    Image { destination: String, title: String },
    FootnoteReference { label: String },
    TaskMarker { checked: bool },
    /// Inline container we render transparently.
    Span,
}

impl NodeKind {
    /// Short, stable tag used in structural snapshot keys.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::FrontMatter => "front-matter",
            Self::Heading(_) => "heading",
            Self::Paragraph => "paragraph",
            Self::BlockQuote => "blockquote",
            Self::List { .. } => "list",
            Self::Item => "item",
            Self::CodeBlock { .. } => "code-block",
            Self::HtmlBlock => "html-block",
            Self::Rule => "rule",
            Self::Table(_) => "table",
            Self::TableHead => "table-head",
            Self::TableRow => "table-row",
            Self::TableCell => "table-cell",
            Self::FootnoteDefinition { .. } => "footnote-definition",
            Self::Block => "block",
            Self::Text => "text",
            Self::Code => "code",
            Self::InlineHtml => "inline-html",
            Self::SoftBreak => "soft-break",
            Self::HardBreak => "hard-break",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::Strikethrough => "strikethrough",
            Self::Link { .. } => "link",
            Self::Image { .. } => "image",
            Self::FootnoteReference { .. } => "footnote-reference",
            Self::TaskMarker { .. } => "task-marker",
            Self::Span => "span",
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::FrontMatter
                | Self::Heading(_)
                | Self::Paragraph
                | Self::BlockQuote
                | Self::List { .. }
                | Self::Item
                | Self::CodeBlock { .. }
                | Self::HtmlBlock
                | Self::Rule
                | Self::Table(_)
                | Self::TableHead
                | Self::TableRow
                | Self::TableCell
                | Self::FootnoteDefinition { .. }
                | Self::Block
        )
    }

    /// Block-level elements the browser can scroll to.
    pub fn is_scroll_target(&self) -> bool {
        matches!(self, Self::Heading(_) | Self::Paragraph | Self::Item | Self::BlockQuote)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Literal text carried by the node itself (text runs, code, raw HTML).
    pub literal: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTree {
    nodes: Vec<Node>,
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTree {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                literal: String::new(),
                parent: None,
                children: Vec::new(),
                attributes: Vec::new(),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn push(&mut self, parent: NodeId, kind: NodeKind, literal: impl Into<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            literal: literal.into(),
            parent: Some(parent),
            children: Vec::new(),
            attributes: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn append_literal(&mut self, id: NodeId, text: &str) {
        self.nodes[id].literal.push_str(text);
    }

    /// Number of ancestors; the root has depth `0`.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Sets or replaces an attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let attributes = &mut self.nodes[id].attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Points an image node at a new source. Other nodes are left alone.
    pub fn set_image_destination(&mut self, id: NodeId, value: String) {
        if let NodeKind::Image { destination, .. } = &mut self.nodes[id].kind {
            *destination = value;
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text the node naturally contains.
    ///
    /// Leaves contribute their literal. Containers contribute the text of inline
    /// descendants, stopping at nested block-level nodes, so a list's text does not include
    /// its items and a document's text is empty. Links and images also contribute their
    /// destination.
    pub fn own_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_own_text(id, &mut out);
        out
    }

    fn collect_own_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&node.literal);
        if let NodeKind::Link { destination, .. } | NodeKind::Image { destination, .. } =
            &node.kind
        {
            out.push('\u{1f}');
            out.push_str(destination);
        }
        for &child in &node.children {
            if !self.nodes[child].kind.is_block() {
                self.collect_own_text(child, out);
            }
        }
    }

    /// Concatenated literal text of every descendant (used for image alt text).
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            out.push_str(&node.literal);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{DocTree, NodeKind};

    fn sample() -> DocTree {
        let mut tree = DocTree::new();
        let list = tree.push(DocTree::ROOT, NodeKind::List { start: None }, "");
        let item = tree.push(list, NodeKind::Item, "");
        tree.push(item, NodeKind::Text, "first");
        let nested = tree.push(item, NodeKind::List { start: None }, "");
        let nested_item = tree.push(nested, NodeKind::Item, "");
        tree.push(nested_item, NodeKind::Text, "inner");
        tree
    }

    #[test]
    fn arena_order_is_document_order() {
        let tree = sample();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.children(DocTree::ROOT), &[1]);
        assert_eq!(tree.parent(6), Some(5));
        assert_eq!(tree.depth(6), 5);
        assert_eq!(tree.ancestors(5).collect::<Vec<_>>(), vec![4, 2, 1, 0]);
    }

    #[test]
    fn own_text_stops_at_nested_blocks() {
        let tree = sample();
        assert_eq!(tree.own_text(2), "first");
        assert_eq!(tree.own_text(5), "inner");
        assert_eq!(tree.own_text(1), "");
        assert_eq!(tree.own_text(DocTree::ROOT), "");
        assert_eq!(tree.plain_text(1), "firstinner");
    }

    #[test]
    fn set_attribute_replaces_existing_value() {
        let mut tree = sample();
        tree.set_attribute(2, "id", "a");
        tree.set_attribute(2, "id", "b");
        assert_eq!(tree.attribute(2, "id"), Some("b"));
        assert_eq!(tree.node(2).attributes.len(), 1);
    }
}
