// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The external diagramming engine seam and its one-time initialization.
//!
//! Lifecycle: the engine configuration is installed once per process and is immutable
//! afterwards. Each engine handle initializes its engine lazily, on first use, with that
//! configuration. There is no teardown; engines live until the process exits.

use std::cell::OnceCell;
use std::rc::Rc;
use std::sync::OnceLock;

use futures::future::LocalBoxFuture;

use super::surface::HostId;
use crate::config::EngineConfig;
use crate::model::RenderId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Raw engine output, before post-processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineArtifact {
    pub markup: String,
}

/// A diagramming engine that turns diagram source into markup.
///
/// Engines cannot observe cancellation: the returned future may be dropped at any await point,
/// and any nodes the engine inserted on the surface before that are swept by the scheduler.
pub trait DiagramEngine {
    fn initialize(&self, config: &EngineConfig);

    fn validate_syntax(&self, text: &str) -> Result<(), EngineError>;

    /// Renders `text` as an artifact whose root element id is `id`, laying it out in `host` when
    /// one is given.
    fn render_to_artifact(
        &self,
        id: &RenderId,
        text: &str,
        host: Option<HostId>,
    ) -> LocalBoxFuture<'static, Result<EngineArtifact, EngineError>>;
}

static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Installs the process-wide engine configuration.
///
/// Only the first call takes effect; later calls return the configuration already installed.
pub fn install_engine_config(config: EngineConfig) -> &'static EngineConfig {
    let mut candidate = Some(config);
    let installed = ENGINE_CONFIG.get_or_init(|| candidate.take().unwrap_or_default());
    if let Some(rejected) = candidate {
        if &rejected != installed {
            tracing::warn!("engine configuration already installed; ignoring a different one");
        }
    }
    installed
}

/// The process-wide engine configuration, installing the default one if none is set yet.
pub fn engine_config() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}

/// An engine that is initialized on first use, exactly once.
pub struct LazyEngine {
    engine: Rc<dyn DiagramEngine>,
    ready: OnceCell<&'static EngineConfig>,
}

impl LazyEngine {
    pub fn new(engine: Rc<dyn DiagramEngine>) -> Self {
        Self { engine, ready: OnceCell::new() }
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.get().is_some()
    }

    pub fn get(&self) -> &dyn DiagramEngine {
        self.ready.get_or_init(|| {
            let config = engine_config();
            self.engine.initialize(config);
            tracing::debug!(theme = %config.theme, "diagram engine initialized");
            config
        });
        &*self.engine
    }
}

impl std::fmt::Debug for LazyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyEngine").field("initialized", &self.is_initialized()).finish()
    }
}
