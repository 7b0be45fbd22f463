// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: identifiers, tabs and the backend payload shapes.

pub mod ids;
pub mod payload;
pub mod tab;

pub use ids::{Id, IdError, InstanceId, RenderId};
pub use payload::{ResultPayload, RunResult};
pub use tab::{ParseViewTabError, ViewTab};
