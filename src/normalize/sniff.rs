// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use regex::Regex;

/// Diagram-type keywords accepted on the first non-blank line.
pub const DIAGRAM_KEYWORDS: [&str; 2] = ["flowchart", "graph"];

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(flowchart|graph)\b").expect("keyword regex"))
}

/// First line of `text` that is not blank, trimmed.
pub fn first_non_blank_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// The diagram keyword `text` starts with, if any.
pub fn diagram_keyword(text: &str) -> Option<&'static str> {
    let line = first_non_blank_line(text)?;
    let found = keyword_re().captures(line)?.get(1)?.as_str();
    DIAGRAM_KEYWORDS.iter().copied().find(|keyword| *keyword == found)
}

pub fn looks_like_diagram(text: &str) -> bool {
    diagram_keyword(text).is_some()
}
