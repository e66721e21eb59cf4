// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};
use serde_json::json;

use crate::config::RenderOptions;
use crate::model::DocumentUri;

use super::{
    escape_html, unescape_html, write_html, DocTree, ImageInliner, MarkdownRenderer, NodeKind,
    Renderer,
};

#[fixture]
fn renderer() -> MarkdownRenderer {
    MarkdownRenderer::default()
}

fn uri() -> DocumentUri {
    DocumentUri::new("file:///ws/a.md")
}

fn render(renderer: &MarkdownRenderer, source: &str) -> String {
    let parsed = renderer.parse(source, &uri());
    write_html(&parsed.tree, &|_| None)
}

#[rstest]
fn heading_and_paragraph_become_tree_nodes(renderer: MarkdownRenderer) {
    let parsed = renderer.parse("# Title\n\nHello", &uri());
    let tree = &parsed.tree;

    let top = tree.children(DocTree::ROOT);
    assert_eq!(top.len(), 2);
    assert_eq!(tree.kind(top[0]), &NodeKind::Heading(1));
    assert_eq!(tree.kind(top[1]), &NodeKind::Paragraph);
    assert_eq!(tree.own_text(top[1]), "Hello");
    assert!(parsed.metadata.is_empty());
}

#[rstest]
#[case("# Title", "<h1>Title</h1>\n")]
#[case("Hello *there*", "<p>Hello <em>there</em></p>\n")]
#[case("a ~~b~~ `c`", "<p>a <del>b</del> <code>c</code></p>\n")]
#[case("> quoted", "<blockquote>\n<p>quoted</p>\n</blockquote>\n")]
#[case("- one\n- two", "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n")]
#[case("3. three", "<ol start=\"3\">\n<li>three</li>\n</ol>\n")]
#[case("***", "<hr />\n")]
fn renders_common_blocks(renderer: MarkdownRenderer, #[case] source: &str, #[case] html: &str) {
    assert_eq!(render(&renderer, source), html);
}

#[rstest]
fn fenced_code_keeps_language_class_and_escapes(renderer: MarkdownRenderer) {
    let html = render(&renderer, "```plantuml\n@startuml\nA -> B\n@enduml\n```\n");
    assert_eq!(
        html,
        "<pre><code class=\"language-plantuml\">@startuml\nA -&gt; B\n@enduml\n</code></pre>\n"
    );
}

#[rstest]
fn raw_html_is_passed_through(renderer: MarkdownRenderer) {
    let html = render(&renderer, "<div class=\"note\">hi</div>\n\ntext <b>bold</b>");
    assert!(html.contains("<div class=\"note\">hi</div>"));
    assert!(html.contains("<b>bold</b>"));
}

#[rstest]
fn tables_use_header_cells_and_alignment(renderer: MarkdownRenderer) {
    let html = render(&renderer, "| a | b |\n|:--|--:|\n| 1 | 2 |\n");
    assert!(html.starts_with("<table><thead><tr><th style=\"text-align: left\">a</th>"));
    assert!(html.contains("<td style=\"text-align: right\">2</td>"));
    assert!(html.ends_with("</tbody></table>\n"));
}

#[rstest]
fn task_list_markers_render_as_checkboxes(renderer: MarkdownRenderer) {
    let html = render(&renderer, "- [x] done\n- [ ] todo");
    assert!(html.contains("<input disabled=\"\" type=\"checkbox\" checked=\"\"/>"));
    assert!(html.contains("<input disabled=\"\" type=\"checkbox\"/>"));
}

#[rstest]
fn front_matter_is_parsed_and_not_rendered(renderer: MarkdownRenderer) {
    let parsed = renderer.parse("---\ntitle: Notes\ntags: [a, b]\n---\n\nBody", &uri());
    assert_eq!(parsed.metadata.get("title"), Some(&json!("Notes")));
    assert_eq!(parsed.metadata.get("tags"), Some(&json!(["a", "b"])));
    assert_eq!(write_html(&parsed.tree, &|_| None), "<p>Body</p>\n");
}

#[rstest]
fn invalid_front_matter_yields_empty_metadata(renderer: MarkdownRenderer) {
    let parsed = renderer.parse("---\n- not\n- a map\n---\n\nBody", &uri());
    assert!(parsed.metadata.is_empty());
}

#[rstest]
fn link_hook_tags_internal_links(renderer: MarkdownRenderer) {
    let parsed = renderer.parse("[next](b.md) and [web](https://example.com)", &uri());
    let html = write_html(&parsed.tree, &|dest| {
        (dest == "b.md").then(|| "/b.md".to_owned())
    });
    assert!(html.contains(
        "<a href=\"b.md\" class=\"internal-link\" data-target=\"/b.md\">next</a>"
    ));
    assert!(html.contains("<a href=\"https://example.com\">web</a>"));
}

#[rstest]
fn anchor_attribute_is_emitted_on_marked_node(renderer: MarkdownRenderer) {
    let mut parsed = renderer.parse("# Title\n\nHello", &uri());
    let paragraph = parsed.tree.children(DocTree::ROOT)[1];
    parsed.tree.set_attribute(paragraph, "id", "marksync-scroll-anchor");
    assert_eq!(
        write_html(&parsed.tree, &|_| None),
        "<h1>Title</h1>\n<p id=\"marksync-scroll-anchor\">Hello</p>\n"
    );
}

#[test]
fn footnotes_render_when_enabled() {
    let renderer = MarkdownRenderer::new(RenderOptions { footnotes: true, ..RenderOptions::default() });
    let html = render(&renderer, "Text[^1]\n\n[^1]: Note");
    assert!(html.contains("<sup class=\"footnote-reference\"><a href=\"#fn-1\">1</a></sup>"));
    assert!(html.contains("<div class=\"footnote-definition\" id=\"fn-1\">"));
}

#[test]
fn wikilinks_point_at_markdown_files() {
    let renderer = MarkdownRenderer::new(RenderOptions { wikilinks: true, ..RenderOptions::default() });
    let parsed = renderer.parse("see [[Other Page]]", &uri());
    let link = (0..parsed.tree.len())
        .find_map(|id| match parsed.tree.kind(id) {
            NodeKind::Link { destination, .. } => Some(destination.clone()),
            _ => None,
        })
        .expect("wiki link");
    assert_eq!(link, "Other Page.md");
}

#[rstest]
#[case("a < b & \"c\"", "a &lt; b &amp; &quot;c&quot;")]
#[case("it's", "it&#39;s")]
fn escape_html_covers_special_characters(#[case] raw: &str, #[case] escaped: &str) {
    assert_eq!(escape_html(raw), escaped);
    assert_eq!(unescape_html(escaped), raw);
}

#[test]
fn unescape_html_decodes_numeric_references_and_keeps_stray_ampersands() {
    assert_eq!(unescape_html("&#65;&#x42; & &bogus;"), "AB & &bogus;");
}

#[test]
fn emoji_shortcodes_are_replaced_when_enabled() {
    let source = ":rocket: launch :+1: :notanemoji: `:rocket:`";

    let plain = render(&MarkdownRenderer::default(), source);
    assert_eq!(plain, "<p>:rocket: launch :+1: :notanemoji: <code>:rocket:</code></p>\n");

    let renderer = MarkdownRenderer::new(RenderOptions { emoji: true, ..RenderOptions::default() });
    assert_eq!(
        render(&renderer, source),
        "<p>\u{1f680} launch \u{1f44d} :notanemoji: <code>:rocket:</code></p>\n"
    );
}

struct ImageWorkspace {
    root: tempfile::TempDir,
    outside: tempfile::TempDir,
}

impl ImageWorkspace {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("workspace");
        let outside = tempfile::tempdir().expect("outside");
        for (relative, bytes) in [
            ("docs/img/dot.png", &b"png"[..]),
            ("shared/logo.svg", &b"<svg/>"[..]),
            ("docs/notes.txt", &b"text"[..]),
        ] {
            let path = root.path().join(relative);
            std::fs::create_dir_all(path.parent().expect("parent")).expect("dirs");
            std::fs::write(path, bytes).expect("write");
        }
        std::fs::write(outside.path().join("secret.png"), b"png").expect("write");
        Self { root, outside }
    }

    fn render(&self, inliner: &ImageInliner, source: &str) -> (String, usize) {
        let document = self.root.path().join("docs/a.md");
        let uri = DocumentUri::from_file_path(&document);
        let mut tree = MarkdownRenderer::default().parse(source, &uri).tree;
        let inlined = inliner.inline(&mut tree, &document);
        (write_html(&tree, &|_| None), inlined)
    }
}

#[rstest]
#[case("![dot](img/dot.png)", "data:image/png;base64,cG5n")]
#[case("![dot](./img/dot.png?v=2)", "data:image/png;base64,cG5n")]
#[case("![logo](../shared/logo.svg)", "data:image/svg+xml;base64,PHN2Zy8+")]
#[case("![logo](/shared/logo.svg)", "data:image/svg+xml;base64,PHN2Zy8+")]
fn local_images_are_embedded(#[case] source: &str, #[case] data_uri: &str) {
    let workspace = ImageWorkspace::new();
    let inliner = ImageInliner::new(workspace.root.path());

    let (html, inlined) = workspace.render(&inliner, source);

    assert_eq!(inlined, 1);
    assert!(html.contains(&format!("src=\"{data_uri}\"")), "{html}");
}

#[rstest]
#[case("![remote](https://example.com/a.png)")]
#[case("![proto](//cdn.example.com/a.png)")]
#[case("![missing](img/missing.png)")]
#[case("![text](notes.txt)")]
fn other_images_keep_their_source(#[case] source: &str) {
    let workspace = ImageWorkspace::new();
    let inliner = ImageInliner::new(workspace.root.path());

    let (html, inlined) = workspace.render(&inliner, source);

    assert_eq!(inlined, 0);
    assert!(!html.contains("data:"));
}

#[test]
fn images_outside_the_workspace_or_over_the_cap_are_not_embedded() {
    let workspace = ImageWorkspace::new();
    let escape = format!("![x]({}/secret.png)", workspace.outside.path().display());
    let relative_escape = "![x](../../../../../../../../../../../../secret.png)";

    let inliner = ImageInliner::new(workspace.root.path());
    assert_eq!(workspace.render(&inliner, &escape).1, 0);
    assert_eq!(workspace.render(&inliner, relative_escape).1, 0);

    let capped = ImageInliner::new(workspace.root.path()).with_max_bytes(2);
    let (html, inlined) = workspace.render(&capped, "![dot](img/dot.png)");
    assert_eq!(inlined, 0);
    assert!(html.contains("src=\"img/dot.png\""));
}
