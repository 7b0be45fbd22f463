// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! codelens-flow: the diagram pipeline behind a code explanation view.
//!
//! An analysis result is normalized into diagram text ([`normalize`]), validated and rendered
//! off-screen ([`render`]), and mounted by a cancellable render session ([`schedule`]). The
//! [`view`] controller owns tab state and is the only thing that starts or tears down sessions.

pub mod config;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod render;
pub mod schedule;
pub mod view;

pub use config::{ConfigError, EngineConfig};
pub use model::{ResultPayload, RunResult, ViewTab};
pub use normalize::{normalize, Normalizer};
pub use render::{DiagramEngine, DiagramRenderer, DiagramSurface, MemorySurface, MmdcEngine};
pub use schedule::{RenderOutcome, RenderPhase, RenderScheduler, SessionEnd};
pub use view::{PanelView, ViewStateController};
