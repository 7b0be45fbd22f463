// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{Map, Value};

use super::sniff::looks_like_diagram;
use super::{extract_with, Strategy};

/// Keys that may hold diagram source, in priority order.
pub const DIAGRAM_KEY_ALIASES: [&str; 6] =
    ["diagram", "mermaid", "graph", "flowchart", "chart", "diagramText"];

pub const LINES_KEY: &str = "lines";

/// Indent levels beyond this are clamped; each level renders as two spaces.
pub const MAX_INDENT_LEVEL: usize = 256;

const TEXT: Strategy = Strategy { name: "text", extract: text };
const LINE_SEQUENCE: Strategy = Strategy { name: "line-sequence", extract: line_sequence };
const ALIASED_KEY: Strategy = Strategy { name: "aliased-key", extract: aliased_key };
const NESTED_LINES: Strategy = Strategy { name: "nested-lines", extract: nested_lines };
const KEYWORD_SCAN: Strategy = Strategy { name: "keyword-scan", extract: keyword_scan };

/// Shape-driven strategies. Nested candidates are normalized with these only, so the keyword
/// scan applies to the top-level mapping alone.
pub const STRUCTURAL_STRATEGIES: &[Strategy] = &[TEXT, LINE_SEQUENCE, ALIASED_KEY, NESTED_LINES];

pub const STANDARD_STRATEGIES: &[Strategy] =
    &[TEXT, LINE_SEQUENCE, ALIASED_KEY, NESTED_LINES, KEYWORD_SCAN];

fn structural(value: &Value) -> String {
    extract_with(STRUCTURAL_STRATEGIES, value).map(|extraction| extraction.text).unwrap_or_default()
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn text(value: &Value) -> Option<String> {
    non_empty(value.as_str()?.trim().to_owned())
}

fn line_sequence(value: &Value) -> Option<String> {
    non_empty(join_lines(value.as_array()?).trim().to_owned())
}

fn aliased_key(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    DIAGRAM_KEY_ALIASES
        .iter()
        .filter_map(|key| map.get(*key))
        .map(structural)
        .find(|text| !text.is_empty())
}

fn nested_lines(value: &Value) -> Option<String> {
    let lines = value.as_object()?.get(LINES_KEY)?.as_array()?;
    non_empty(join_lines(lines).trim().to_owned())
}

fn keyword_scan(value: &Value) -> Option<String> {
    let map: &Map<String, Value> = value.as_object()?;
    map.values().map(structural).find(|text| looks_like_diagram(text))
}

/// Renders each entry as one line: strings verbatim, `{text, indent}` objects with two spaces
/// per indent level, anything else as its string representation.
pub fn join_lines(lines: &[Value]) -> String {
    lines.iter().map(render_line).collect::<Vec<_>>().join("\n")
}

fn render_line(line: &Value) -> String {
    match line {
        Value::String(text) => text.clone(),
        Value::Object(fields) => {
            let indent = fields.get("indent").map(indent_level).unwrap_or(0);
            let text = match fields.get("text") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
            };
            format!("{}{text}", " ".repeat(indent * 2))
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn indent_level(value: &Value) -> usize {
    let level = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(raw) => raw.trim().parse::<u64>().ok(),
        _ => None,
    };
    level.map_or(0, |level| usize::try_from(level).unwrap_or(MAX_INDENT_LEVEL).min(MAX_INDENT_LEVEL))
}
