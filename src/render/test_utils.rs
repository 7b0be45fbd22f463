// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::{Cell, RefCell};

use futures::future::LocalBoxFuture;
use tokio::sync::oneshot;

use super::engine::{DiagramEngine, EngineArtifact, EngineError};
use super::surface::{HostId, NodeParent, SharedSurface};
use crate::config::EngineConfig;
use crate::model::RenderId;

type Gate = oneshot::Sender<Result<(), String>>;

/// Engine double that counts calls and, when gated, holds every render until released.
#[derive(Default)]
pub(crate) struct ScriptedEngine {
    init_calls: Cell<usize>,
    validate_calls: Cell<usize>,
    render_calls: Cell<usize>,
    hosts_seen: Cell<usize>,
    syntax_error: Option<String>,
    render_error: Option<String>,
    gated: bool,
    leak_into: Option<SharedSurface>,
    leak_on_settle: Option<SharedSurface>,
    gates: RefCell<Vec<(RenderId, Gate)>>,
}

impl ScriptedEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rejecting_syntax(mut self, message: &str) -> Self {
        self.syntax_error = Some(message.to_owned());
        self
    }

    pub(crate) fn failing(mut self, message: &str) -> Self {
        self.render_error = Some(message.to_owned());
        self
    }

    pub(crate) fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    /// Inserts stray nodes tagged with the render id as soon as a render starts, like engines
    /// that write measurement nodes into the document.
    pub(crate) fn leaking_into(mut self, surface: SharedSurface) -> Self {
        self.leak_into = Some(surface);
        self
    }

    /// Keeps working apart from the returned future: once a gated render is released or
    /// rejected, a `{id}-late` node lands in the body, even if the caller stopped waiting.
    pub(crate) fn leaking_on_settle(mut self, surface: SharedSurface) -> Self {
        self.leak_on_settle = Some(surface);
        self
    }

    pub(crate) fn init_calls(&self) -> usize {
        self.init_calls.get()
    }

    pub(crate) fn validate_calls(&self) -> usize {
        self.validate_calls.get()
    }

    pub(crate) fn render_calls(&self) -> usize {
        self.render_calls.get()
    }

    pub(crate) fn hosts_seen(&self) -> usize {
        self.hosts_seen.get()
    }

    pub(crate) fn pending(&self) -> Vec<RenderId> {
        self.gates.borrow().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Resolves a gated render. Returns `false` if nobody is waiting for it anymore.
    pub(crate) fn release(&self, id: &RenderId) -> bool {
        self.settle(id, Ok(()))
    }

    pub(crate) fn reject(&self, id: &RenderId, message: &str) -> bool {
        self.settle(id, Err(message.to_owned()))
    }

    fn settle(&self, id: &RenderId, outcome: Result<(), String>) -> bool {
        let gate = {
            let mut gates = self.gates.borrow_mut();
            let Some(index) = gates.iter().position(|(pending, _)| pending == id) else {
                return false;
            };
            gates.remove(index).1
        };
        gate.send(outcome).is_ok()
    }
}

pub(crate) fn scripted_markup(id: &RenderId, text: &str) -> String {
    format!(
        r##"<svg id="{id}" data-lines="{}"><rect class="background" fill="#ffffff"/><g class="nodes"/></svg>"##,
        text.lines().count()
    )
}

impl DiagramEngine for ScriptedEngine {
    fn initialize(&self, _config: &EngineConfig) {
        self.init_calls.set(self.init_calls.get() + 1);
    }

    fn validate_syntax(&self, _text: &str) -> Result<(), EngineError> {
        self.validate_calls.set(self.validate_calls.get() + 1);
        match &self.syntax_error {
            Some(message) => Err(EngineError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn render_to_artifact(
        &self,
        id: &RenderId,
        text: &str,
        host: Option<HostId>,
    ) -> LocalBoxFuture<'static, Result<EngineArtifact, EngineError>> {
        self.render_calls.set(self.render_calls.get() + 1);
        if host.is_some() {
            self.hosts_seen.set(self.hosts_seen.get() + 1);
        }

        if let Some(surface) = &self.leak_into {
            let mut surface = surface.borrow_mut();
            surface.insert_node(NodeParent::Body, &format!("{id}-stray"), "<div/>");
            if let Some(host) = host {
                surface.insert_node(NodeParent::Host(host), id.as_str(), "<svg/>");
            }
        }

        let markup = scripted_markup(id, text);
        let failure = self.render_error.clone();

        if !self.gated {
            return Box::pin(async move {
                match failure {
                    Some(message) => Err(EngineError::new(message)),
                    None => Ok(EngineArtifact { markup }),
                }
            });
        }

        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push((id.clone(), tx));

        let Some(surface) = self.leak_on_settle.clone() else {
            return Box::pin(async move { gate_outcome(rx.await, markup) });
        };
        let late_id = format!("{id}-late");
        let (done_tx, done_rx) = oneshot::channel();
        tokio::task::spawn_local(async move {
            let outcome = rx.await;
            if outcome.is_ok() {
                surface.borrow_mut().insert_node(NodeParent::Body, &late_id, "<div/>");
            }
            let _ = done_tx.send(outcome);
        });
        Box::pin(async move {
            let outcome = done_rx.await.unwrap_or_else(|_| Ok(Err("render abandoned".to_owned())));
            gate_outcome(outcome, markup)
        })
    }
}

fn gate_outcome(
    outcome: Result<Result<(), String>, oneshot::error::RecvError>,
    markup: String,
) -> Result<EngineArtifact, EngineError> {
    match outcome {
        Ok(Ok(())) => Ok(EngineArtifact { markup }),
        Ok(Err(message)) => Err(EngineError::new(message)),
        Err(_) => Err(EngineError::new("render abandoned")),
    }
}
