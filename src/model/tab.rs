// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The output view's tabs. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewTab {
    #[default]
    Explanation,
    Flow,
    Output,
}

impl ViewTab {
    pub const ALL: [ViewTab; 3] = [ViewTab::Explanation, ViewTab::Flow, ViewTab::Output];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explanation => "explanation",
            Self::Flow => "flow",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for ViewTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab {0:?} (expected explain, flow or output)")]
pub struct ParseViewTabError(pub String);

impl FromStr for ViewTab {
    type Err = ParseViewTabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explain" | "explanation" => Ok(Self::Explanation),
            "flow" | "diagram" => Ok(Self::Flow),
            "output" | "run" => Ok(Self::Output),
            _ => Err(ParseViewTabError(s.to_owned())),
        }
    }
}
