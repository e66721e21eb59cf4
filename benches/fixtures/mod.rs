// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::fmt::Write as _;

use marksync::model::DocumentUri;

pub fn uri() -> DocumentUri {
    DocumentUri::new("file:///bench/workspace/docs/guide.md")
}

fn words(seed: usize, count: usize) -> String {
    const VOCABULARY: &[&str] = &[
        "preview", "anchor", "render", "diagram", "session", "editor", "browser", "route",
        "document", "snapshot", "payload", "channel",
    ];
    (0..count)
        .map(|offset| VOCABULARY[(seed.wrapping_mul(7) + offset * 5) % VOCABULARY.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocParams {
    pub sections: usize,
    pub paragraphs_per_section: usize,
    pub list_items: usize,
    pub table_rows: usize,
    pub words_per_paragraph: usize,
}

impl DocParams {
    pub const fn new(
        sections: usize,
        paragraphs_per_section: usize,
        list_items: usize,
        table_rows: usize,
        words_per_paragraph: usize,
    ) -> Self {
        Self { sections, paragraphs_per_section, list_items, table_rows, words_per_paragraph }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumMixed,
    LargeLongParagraphs,
}

impl Case {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumMixed => "medium_mixed",
            Self::LargeLongParagraphs => "large_long_paragraphs",
        }
    }

    pub const fn params(self) -> DocParams {
        match self {
            Self::Small => DocParams::new(3, 2, 3, 0, 12),
            Self::MediumMixed => DocParams::new(20, 4, 6, 8, 24),
            Self::LargeLongParagraphs => DocParams::new(80, 6, 10, 16, 80),
        }
    }

    pub const ALL: [Case; 3] = [Case::Small, Case::MediumMixed, Case::LargeLongParagraphs];
}

pub fn markdown(params: DocParams) -> String {
    let mut out = String::from("---\ntitle: Bench guide\ntags: [bench, preview]\n---\n\n");
    for section in 0..params.sections {
        let _ = writeln!(out, "## Section {section}\n");
        for paragraph in 0..params.paragraphs_per_section {
            let seed = section * 31 + paragraph;
            let _ = writeln!(
                out,
                "{} with *emphasis*, `code` and a [link](other-{section}.md#part-{paragraph}).\n",
                words(seed, params.words_per_paragraph)
            );
        }
        for item in 0..params.list_items {
            let _ = writeln!(out, "- [{}] {}", if item % 2 == 0 { "x" } else { " " }, words(item, 4));
        }
        out.push('\n');
        if params.table_rows > 0 {
            out.push_str("| key | value |\n|:----|------:|\n");
            for row in 0..params.table_rows {
                let _ = writeln!(out, "| {} | {row} |", words(row + section, 2));
            }
            out.push('\n');
        }
        if section % 5 == 0 {
            out.push_str("> quoted note\n>\n> - nested item\n\n```rust\nfn main() {}\n```\n\n");
        }
    }
    out
}

/// The same document with one word appended to the paragraph in the middle section.
pub fn edited(params: DocParams) -> String {
    let original = markdown(params);
    let heading = format!("## Section {}\n\n", params.sections / 2);
    match original.find(&heading) {
        Some(at) => {
            let paragraph_start = at + heading.len();
            let paragraph_end = original[paragraph_start..]
                .find('\n')
                .map_or(original.len(), |offset| paragraph_start + offset);
            let mut edited = original.clone();
            edited.insert_str(paragraph_end, " edited");
            edited
        }
        None => format!("{original}\nedited\n"),
    }
}

pub fn fixture(case: Case) -> String {
    markdown(case.params())
}

pub fn edited_fixture(case: Case) -> String {
    edited(case.params())
}

pub fn plantuml_source(participants: usize) -> String {
    let mut out = String::from("@startuml\n");
    for from in 0..participants {
        let to = (from + 1) % participants.max(1);
        let _ = writeln!(out, "P{from} -> P{to}: {}", words(from, 3));
    }
    out.push_str("@enduml\n");
    out
}
