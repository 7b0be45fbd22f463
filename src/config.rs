// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram engine configuration.
//!
//! Field names serialize in the engine's own camelCase vocabulary so the same value can be handed
//! to the engine verbatim (e.g. as a mermaid-cli `--configFile`).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("json error at {path:?}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Strict,
    Loose,
    Antiscript,
    Sandbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowchartConfig {
    pub diagram_padding: u32,
    pub padding: u32,
    pub html_labels: bool,
    pub use_max_width: bool,
    pub node_spacing: u32,
    pub rank_spacing: u32,
}

impl Default for FlowchartConfig {
    fn default() -> Self {
        Self {
            diagram_padding: 2,
            padding: 0,
            html_labels: true,
            use_max_width: true,
            node_spacing: 36,
            rank_spacing: 36,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// The pipeline always drives rendering itself; engines must not scan for diagrams on load.
    pub start_on_load: bool,
    /// Labels generated by the backend contain quotes and brackets, which `strict` rejects.
    pub security_level: SecurityLevel,
    pub theme: String,
    pub flowchart: FlowchartConfig,
    pub theme_variables: BTreeMap<String, String>,
}

const DEFAULT_THEME_VARIABLES: [(&str, &str); 12] = [
    ("background", "transparent"),
    ("primaryColor", "#0f172a"),
    ("primaryTextColor", "#e5e7eb"),
    ("primaryBorderColor", "#334155"),
    ("secondaryColor", "#0b1220"),
    ("secondaryTextColor", "#e5e7eb"),
    ("tertiaryColor", "#111827"),
    ("tertiaryTextColor", "#e5e7eb"),
    ("lineColor", "#93c5fd"),
    ("textColor", "#e6edf3"),
    ("edgeLabelBackground", "transparent"),
    (
        "fontFamily",
        "ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Ubuntu, Cantarell, 'Helvetica Neue', Arial",
    ),
];

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_on_load: false,
            security_level: SecurityLevel::Loose,
            theme: "base".to_owned(),
            flowchart: FlowchartConfig::default(),
            theme_variables: DEFAULT_THEME_VARIABLES
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_owned())
    }
}
