// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Opaque backend response. Shapes vary between endpoints and backend versions, so the pipeline
/// only ever inspects it through the normalizer.
pub type ResultPayload = serde_json::Value;

/// Result of the backend's `Run(code, language, postlude)` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_code: Option<i64>,
}

impl RunResult {
    /// A failed run reported locally, e.g. when an upload is rejected before reaching the backend.
    pub fn local_failure(message: impl Into<String>) -> Self {
        Self { stdout: String::new(), stderr: message.into(), exit_code: Some(1) }
    }
}
