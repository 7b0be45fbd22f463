// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram validation and rendering.
//!
//! Validation is a cheap, synchronous gate: text that is not diagram-shaped is rejected before the
//! engine is touched at all. Rendering lays the artifact out in an off-screen host and hands it
//! back post-processed; mounting it is the caller's decision.

pub mod engine;
pub mod mmdc;
pub mod postprocess;
pub mod surface;
#[cfg(test)]
pub(crate) mod test_utils;

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::model::RenderId;
use crate::normalize::{diagram_keyword, DIAGRAM_KEYWORDS};

pub use engine::{
    engine_config, install_engine_config, DiagramEngine, EngineArtifact, EngineError, LazyEngine,
};
pub use mmdc::MmdcEngine;
pub use surface::{
    DiagramSurface, HostId, MemorySurface, NodeParent, SharedSurface, SurfaceNode,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Diagram text does not look like Mermaid (should start with {expected}).")]
    NotDiagramShaped { expected: String },
    #[error("{message}")]
    Syntax { message: String },
}

impl ParseError {
    fn not_diagram_shaped() -> Self {
        let expected =
            DIAGRAM_KEYWORDS.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(" or ");
        Self::NotDiagramShaped { expected }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

/// A post-processed artifact ready to be mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub render_id: RenderId,
    pub markup: String,
}

#[derive(Debug)]
pub struct DiagramRenderer {
    engine: LazyEngine,
}

impl DiagramRenderer {
    pub fn new(engine: Rc<dyn DiagramEngine>) -> Self {
        Self { engine: LazyEngine::new(engine) }
    }

    pub fn engine(&self) -> &LazyEngine {
        &self.engine
    }

    /// Returns the diagram keyword on success.
    pub fn validate(&self, text: &str) -> Result<&'static str, ParseError> {
        let Some(keyword) = diagram_keyword(text) else {
            return Err(ParseError::not_diagram_shaped());
        };
        self.engine
            .get()
            .validate_syntax(text)
            .map_err(|err| ParseError::Syntax { message: err.message })?;
        Ok(keyword)
    }

    /// Renders `text` off-screen. The host is detached again however the call ends, including
    /// when the returned future is dropped.
    ///
    /// The future owns everything it needs, so a caller that stops waiting for it can keep it
    /// running until the engine settles.
    pub fn render(
        &self,
        id: &RenderId,
        text: &str,
        surface: &SharedSurface,
    ) -> LocalBoxFuture<'static, Result<Artifact, RenderError>> {
        let host = HostGuard::attach(surface);
        let pending = self.engine.get().render_to_artifact(id, text, Some(host.id));
        let render_id = id.clone();
        Box::pin(async move {
            let result = pending.await;
            drop(host);

            let raw = result.map_err(|err| RenderError { message: err.message })?;
            Ok(Artifact { render_id, markup: postprocess::neutralize_background(&raw.markup) })
        })
    }
}

struct HostGuard {
    surface: SharedSurface,
    id: HostId,
}

impl HostGuard {
    fn attach(surface: &SharedSurface) -> Self {
        let id = surface.borrow_mut().attach_offscreen_host();
        Self { surface: surface.clone(), id }
    }
}

impl Drop for HostGuard {
    fn drop(&mut self) {
        match self.surface.try_borrow_mut() {
            Ok(mut surface) => surface.detach_offscreen_host(self.id),
            Err(_) => tracing::warn!(
                host = ?self.id,
                "surface busy while releasing off-screen host; host stays attached"
            ),
        }
    }
}
