// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Snapshot of what the output view shows.

use std::fmt;

use serde_json::Value;

use crate::model::RunResult;
use crate::normalize::indent_level;
use crate::schedule::RenderPhase;

pub const WORKING: &str = "Working…";
pub const READY: &str = "Ready";
pub const NO_DIAGRAM_TEXT: &str = "No diagram text found.";
pub const NO_DIAGRAM_YET: &str = "No diagram yet.";
pub const EMPTY_STREAM: &str = "—";

/// The panel currently mounted, or one of the top-level states that replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    Working,
    RequestError(String),
    Explanation(String),
    Flow(FlowPanel),
    Output(OutputPanel),
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Working => f.write_str(WORKING),
            Self::RequestError(message) | Self::Explanation(message) => f.write_str(message),
            Self::Flow(panel) => panel.fmt(f),
            Self::Output(panel) => panel.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPanel {
    pub phase: RenderPhase,
    /// Markup of the live container.
    pub markup: Option<String>,
    pub error: Option<String>,
    pub raw_text: String,
}

impl FlowPanel {
    pub fn disclosure_label(&self) -> &'static str {
        if self.error.is_some() {
            "Show error & raw diagram"
        } else {
            "Show raw diagram"
        }
    }

    pub fn raw_text_or_placeholder(&self) -> &str {
        if self.raw_text.is_empty() {
            NO_DIAGRAM_TEXT
        } else {
            &self.raw_text
        }
    }

    /// Shown in place of the container when nothing is mounted and nothing went wrong.
    pub fn placeholder(&self) -> Option<&'static str> {
        (self.markup.is_none() && self.error.is_none()).then_some(NO_DIAGRAM_YET)
    }
}

impl fmt::Display for FlowPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(markup) = &self.markup {
            writeln!(f, "{markup}")?;
        } else if let Some(placeholder) = self.placeholder() {
            writeln!(f, "{placeholder}")?;
        }
        writeln!(f)?;
        writeln!(f, "▸ {}", self.disclosure_label())?;
        if let Some(error) = &self.error {
            writeln!(f, "{error}")?;
        }
        f.write_str(self.raw_text_or_placeholder())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPanel {
    pub exit_code: Option<i64>,
    pub stdout: String,
    pub stderr: String,
}

impl OutputPanel {
    pub fn from_run(run: Option<&RunResult>) -> Self {
        run.map(|run| Self {
            exit_code: run.exit_code,
            stdout: run.stdout.clone(),
            stderr: run.stderr.clone(),
        })
        .unwrap_or_default()
    }
}

fn stream_or_dash(stream: &str) -> &str {
    if stream.is_empty() {
        EMPTY_STREAM
    } else {
        stream
    }
}

impl fmt::Display for OutputPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => writeln!(f, "exit code:{code}")?,
            None => writeln!(f, "exit code:{EMPTY_STREAM}")?,
        }
        writeln!(f, "stdout")?;
        writeln!(f, "{}", stream_or_dash(&self.stdout))?;
        writeln!(f, "stderr")?;
        f.write_str(stream_or_dash(&self.stderr))
    }
}

/// Picks the explanation out of an analysis result; results without one are shown whole.
pub fn explanation_of(result: Option<&Value>) -> Option<&Value> {
    let result = result.filter(|value| !value.is_null())?;
    match result.get("explanation") {
        Some(explanation) if !explanation.is_null() => Some(explanation),
        _ => Some(result),
    }
}

/// Renders an explanation as plain text.
///
/// Strings are shown as is and sequences one entry per line, with two spaces per indent level for
/// `{text, indent}` entries. Entries without `text` fall back to their JSON form, as does anything
/// that is neither.
pub fn render_explanation(explanation: Option<&Value>) -> String {
    match explanation {
        None | Some(Value::Null) => READY.to_owned(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(lines)) => {
            lines.iter().map(explanation_line).collect::<Vec<_>>().join("\n")
        }
        Some(object @ Value::Object(_)) => {
            serde_json::to_string_pretty(object).unwrap_or_else(|_| object.to_string())
        }
        Some(other) => other.to_string(),
    }
}

fn explanation_line(line: &Value) -> String {
    match line {
        Value::String(text) => text.clone(),
        Value::Object(fields) => {
            let text = match fields.get("text") {
                None | Some(Value::Null) => line.to_string(),
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
            };
            let indent = fields.get("indent").map(indent_level).unwrap_or(0);
            format!("{}{text}", "  ".repeat(indent))
        }
        other => other.to_string(),
    }
}
