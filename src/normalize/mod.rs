// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Payload normalization.
//!
//! Backend results arrive in many shapes (plain strings, line sequences, objects with the diagram
//! under one of several keys). Normalization turns any of them into a single diagram source
//! string by trying an ordered registry of named extraction strategies; the first strategy that
//! yields non-empty text wins. Normalization never fails: anything unrecognized becomes `""`.

mod sniff;
mod strategies;

use std::fmt;

use serde_json::Value;

pub use sniff::{diagram_keyword, first_non_blank_line, looks_like_diagram, DIAGRAM_KEYWORDS};
pub(crate) use strategies::indent_level;
pub use strategies::{
    join_lines, DIAGRAM_KEY_ALIASES, LINES_KEY, MAX_INDENT_LEVEL, STANDARD_STRATEGIES,
    STRUCTURAL_STRATEGIES,
};

/// A pure extraction function from a candidate value to diagram text.
pub type ExtractFn = fn(&Value) -> Option<String>;

/// One named step of the normalization registry.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub extract: ExtractFn,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Diagram text together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub strategy: &'static str,
    pub text: String,
}

/// Ordered registry of extraction strategies.
#[derive(Debug, Clone)]
pub struct Normalizer {
    strategies: Vec<Strategy>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::standard()
    }
}

impl Normalizer {
    pub fn empty() -> Self {
        Self { strategies: Vec::new() }
    }

    /// The registry used by the output view: structural strategies, then the keyword scan.
    pub fn standard() -> Self {
        Self { strategies: STANDARD_STRATEGIES.to_vec() }
    }

    pub fn add(&mut self, name: &'static str, extract: ExtractFn) {
        self.strategies.push(Strategy { name, extract });
    }

    pub fn strategy_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().map(|strategy| strategy.name)
    }

    pub fn extract(&self, payload: &Value) -> Option<Extraction> {
        extract_with(&self.strategies, payload)
    }

    pub fn normalize(&self, payload: &Value) -> String {
        self.extract(payload).map(|extraction| extraction.text).unwrap_or_default()
    }
}

pub(crate) fn extract_with(strategies: &[Strategy], payload: &Value) -> Option<Extraction> {
    strategies.iter().find_map(|strategy| {
        let text = (strategy.extract)(payload)?;
        (!text.is_empty()).then_some(Extraction { strategy: strategy.name, text })
    })
}

/// Normalizes `payload` with the standard registry.
pub fn normalize(payload: &Value) -> String {
    extract_with(STANDARD_STRATEGIES, payload).map(|extraction| extraction.text).unwrap_or_default()
}
