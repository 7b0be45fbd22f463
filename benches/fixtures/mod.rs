// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Deterministic analysis-result fixtures (no RNG).

use serde_json::{json, Value};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    MediumLines,
    LargeNested,
    LargeKeywordScan,
}

impl Case {
    pub const ALL: [Case; 4] =
        [Case::Small, Case::MediumLines, Case::LargeNested, Case::LargeKeywordScan];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumLines => "medium_lines",
            Self::LargeNested => "large_nested",
            Self::LargeKeywordScan => "large_keyword_scan",
        }
    }

    pub const fn edges(self) -> usize {
        match self {
            Self::Small => 8,
            Self::MediumLines => 120,
            Self::LargeNested | Self::LargeKeywordScan => 2_000,
        }
    }
}

fn edge_line(idx: usize) -> String {
    format!("n{idx:04} -->|step {idx}| n{:04}", idx + 1)
}

/// `{text, indent}` entries with a header line, the shape most backends send.
fn diagram_lines(edges: usize) -> Vec<Value> {
    std::iter::once(json!("flowchart TD"))
        .chain((0..edges).map(|idx| json!({"text": edge_line(idx), "indent": 1 + idx % 3})))
        .collect()
}

fn explanation(edges: usize) -> Vec<Value> {
    (0..edges / 4 + 1).map(|idx| json!({"text": format!("Step {idx}"), "indent": idx % 2})).collect()
}

pub fn fixture(case: Case) -> Value {
    let edges = case.edges();
    match case {
        Case::Small => json!({
            "explanation": explanation(edges),
            "diagram": (0..edges).fold("flowchart TD".to_owned(), |mut text, idx| {
                text.push('\n');
                text.push_str(&edge_line(idx));
                text
            }),
        }),
        Case::MediumLines => json!({
            "explanation": explanation(edges),
            "mermaid": diagram_lines(edges),
        }),
        Case::LargeNested => json!({
            "explanation": explanation(edges),
            "diagram": { "lines": diagram_lines(edges) },
        }),
        Case::LargeKeywordScan => json!({
            "explanation": explanation(edges),
            "meta": { "model": "bench", "tokens": edges },
            "result": { "lines": diagram_lines(edges) },
        }),
    }
}
