// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Render scheduling.
//!
//! A [`RenderScheduler`] owns the lifecycle of render sessions for one output view:
//!
//! `Idle → Scheduled → Validating → Rendering → {Rendered | ParseError | RenderError | NoDiagram}`
//!
//! Sessions run as local tasks on the current thread (they must be started inside a
//! [`tokio::task::LocalSet`]). Each session carries a [`CancellationToken`] that is raced against
//! both suspension points (the deferred start and the engine call) and re-checked before every
//! surface mutation. Only the most recently created, non-cancelled session may touch the live
//! container.
//!
//! Cancelling a session also sweeps the surface for nodes tagged with this view's render
//! namespace. Engines cannot take a cancellation token, and some insert nodes into the document
//! before their render resolves; the sweep is the only way to get rid of those. An engine call
//! that was abandoned mid-flight is still awaited in the background, and once it settles its
//! result is dropped and the session's own nodes are swept a second time.


use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::model::{InstanceId, RenderId};
use crate::render::{Artifact, DiagramRenderer, RenderError, SharedSurface};

type PendingRender = LocalBoxFuture<'static, Result<Artifact, RenderError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPhase {
    Idle,
    Scheduled,
    Validating,
    Rendering,
    Rendered,
    ParseError,
    RenderError,
    NoDiagram,
}

impl RenderPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rendered | Self::ParseError | Self::RenderError | Self::NoDiagram)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scheduled => "scheduled",
            Self::Validating => "validating",
            Self::Rendering => "rendering",
            Self::Rendered => "rendered",
            Self::ParseError => "parse-error",
            Self::RenderError => "render-error",
            Self::NoDiagram => "no-diagram",
        }
    }
}

impl fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a session that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    ParseError(String),
    RenderError(String),
    NoDiagram,
}

impl RenderOutcome {
    pub fn phase(&self) -> RenderPhase {
        match self {
            Self::Rendered => RenderPhase::Rendered,
            Self::ParseError(_) => RenderPhase::ParseError,
            Self::RenderError(_) => RenderPhase::RenderError,
            Self::NoDiagram => RenderPhase::NoDiagram,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::ParseError(message) | Self::RenderError(message) => Some(message),
            Self::Rendered | Self::NoDiagram => None,
        }
    }
}

/// How a session ended, from the session's own point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Settled(RenderOutcome),
    /// Cancelled or superseded; nothing it produced was kept.
    Cancelled,
}

/// What the view currently shows for the diagram, as decided by the latest session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub session: Option<RenderId>,
    pub phase: RenderPhase,
    pub message: Option<String>,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self { session: None, phase: RenderPhase::Idle, message: None }
    }
}

/// Handle to a spawned session.
#[derive(Debug)]
pub struct RenderTask {
    id: RenderId,
    handle: JoinHandle<SessionEnd>,
}

impl RenderTask {
    pub fn id(&self) -> &RenderId {
        &self.id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the session to end. A session whose task died is reported as cancelled.
    pub async fn finished(self) -> SessionEnd {
        self.handle.await.unwrap_or(SessionEnd::Cancelled)
    }
}

#[derive(Debug)]
struct LiveSession {
    seq: u64,
    token: CancellationToken,
}

struct SessionTicket {
    id: RenderId,
    seq: u64,
    token: CancellationToken,
    text: String,
}

struct Inner {
    instance: InstanceId,
    namespace: String,
    renderer: DiagramRenderer,
    surface: SharedSurface,
    next_seq: Cell<u64>,
    live: RefCell<Option<LiveSession>>,
    status: RefCell<SchedulerStatus>,
}

pub struct RenderScheduler {
    inner: Rc<Inner>,
}

impl fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("instance", &self.inner.instance)
            .field("status", &*self.inner.status.borrow())
            .finish_non_exhaustive()
    }
}

impl RenderScheduler {
    pub fn new(renderer: DiagramRenderer, surface: SharedSurface) -> Self {
        let instance = InstanceId::next();
        let namespace = instance.namespace();
        Self {
            inner: Rc::new(Inner {
                instance,
                namespace,
                renderer,
                surface,
                next_seq: Cell::new(0),
                live: RefCell::new(None),
                status: RefCell::new(SchedulerStatus::default()),
            }),
        }
    }

    /// Prefix shared by every element id this scheduler's sessions produce.
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.inner.surface
    }

    pub fn status(&self) -> SchedulerStatus {
        self.inner.status.borrow().clone()
    }

    pub fn phase(&self) -> RenderPhase {
        self.inner.status.borrow().phase
    }

    /// Whether a session is scheduled, validating or rendering.
    pub fn has_live_session(&self) -> bool {
        self.inner.live.borrow().is_some()
    }

    /// Starts a new session for `text`, superseding any session in flight.
    ///
    /// Empty text settles immediately as `NoDiagram` and returns `None`. Otherwise the session
    /// is spawned on the current `LocalSet`.
    pub fn schedule(&self, text: &str) -> Option<RenderTask> {
        let inner = &self.inner;
        inner.cancel_live("superseded");

        let seq = inner.next_seq.get() + 1;
        inner.next_seq.set(seq);
        let id = inner.instance.render_id(seq);

        if text.trim().is_empty() {
            tracing::debug!(render_id = %id, "no diagram text");
            *inner.status.borrow_mut() = SchedulerStatus {
                session: Some(id),
                phase: RenderPhase::NoDiagram,
                message: None,
            };
            return None;
        }

        let token = CancellationToken::new();
        *inner.live.borrow_mut() = Some(LiveSession { seq, token: token.clone() });
        *inner.status.borrow_mut() = SchedulerStatus {
            session: Some(id.clone()),
            phase: RenderPhase::Scheduled,
            message: None,
        };
        tracing::debug!(render_id = %id, "render scheduled");

        let ticket = SessionTicket { id: id.clone(), seq, token, text: text.to_owned() };
        let handle = tokio::task::spawn_local(run_session(inner.clone(), ticket));
        Some(RenderTask { id, handle })
    }

    /// Cancels the live session and clears everything this scheduler ever put on the surface.
    ///
    /// Runs synchronously; the surface is clean when this returns. Nodes an abandoned engine call
    /// adds afterwards are swept when that call settles.
    pub fn teardown(&self) {
        let inner = &self.inner;
        inner.cancel_live("teardown");
        *inner.status.borrow_mut() = SchedulerStatus::default();
    }
}

impl Inner {
    fn is_live(&self, seq: u64) -> bool {
        self.live.borrow().as_ref().is_some_and(|live| live.seq == seq && !live.token.is_cancelled())
    }

    fn cancel_live(&self, reason: &'static str) {
        if let Some(live) = self.live.borrow_mut().take() {
            live.token.cancel();
            tracing::debug!(seq = live.seq, reason, "render session cancelled");
        }

        let namespace = self.namespace.as_str();
        let mut surface = self.surface.borrow_mut();
        surface.clear_container();
        let swept = surface.remove_nodes(&|id: &str| id.starts_with(namespace));
        if swept > 0 {
            tracing::debug!(swept, reason, "removed stray diagram nodes");
        }
    }

    fn set_phase(&self, seq: u64, phase: RenderPhase) {
        if self.is_live(seq) {
            self.status.borrow_mut().phase = phase;
        }
    }

    fn settle(&self, ticket: &SessionTicket, outcome: RenderOutcome) -> SessionEnd {
        self.live.borrow_mut().take();
        *self.status.borrow_mut() = SchedulerStatus {
            session: Some(ticket.id.clone()),
            phase: outcome.phase(),
            message: outcome.message().map(str::to_owned),
        };
        SessionEnd::Settled(outcome)
    }

    /// Drops whatever a stale session left behind, without touching newer sessions' nodes.
    fn discard(&self, ticket: &SessionTicket) -> SessionEnd {
        let swept = self.sweep_session(&ticket.id);
        tracing::debug!(render_id = %ticket.id, swept, "stale render discarded");
        SessionEnd::Cancelled
    }

    fn sweep_session(&self, id: &RenderId) -> usize {
        let own = id.as_str();
        let own_prefix = format!("{own}-");
        self.surface
            .borrow_mut()
            .remove_nodes(&|node: &str| node == own || node.starts_with(&own_prefix))
    }
}

/// Waits for an abandoned engine call to settle, then drops its artifact and sweeps the nodes
/// the engine produced for that session in the meantime.
async fn sweep_after_settle(inner: Rc<Inner>, id: RenderId, pending: PendingRender) {
    let settled = pending.await;
    let swept = inner.sweep_session(&id);
    tracing::debug!(
        render_id = %id,
        ok = settled.is_ok(),
        swept,
        "late render settled and discarded"
    );
}

async fn run_session(inner: Rc<Inner>, ticket: SessionTicket) -> SessionEnd {
    // Defer by one cooperative yield so a burst of synchronous updates costs one render.
    tokio::select! {
        biased;
        _ = ticket.token.cancelled() => return inner.discard(&ticket),
        _ = tokio::task::yield_now() => {}
    }
    if !inner.is_live(ticket.seq) {
        return inner.discard(&ticket);
    }

    inner.set_phase(ticket.seq, RenderPhase::Validating);
    if let Err(err) = inner.renderer.validate(&ticket.text) {
        tracing::debug!(render_id = %ticket.id, error = %err, "diagram rejected");
        inner.surface.borrow_mut().clear_container();
        return inner.settle(&ticket, RenderOutcome::ParseError(err.to_string()));
    }

    inner.set_phase(ticket.seq, RenderPhase::Rendering);
    let mut pending = inner.renderer.render(&ticket.id, &ticket.text, &inner.surface);
    let rendered = tokio::select! {
        biased;
        _ = ticket.token.cancelled() => None,
        result = &mut pending => Some(result),
    };

    let Some(result) = rendered else {
        // The engine keeps working after cancellation; clean up again once it is done.
        tokio::task::spawn_local(sweep_after_settle(inner.clone(), ticket.id.clone(), pending));
        return inner.discard(&ticket);
    };
    if !inner.is_live(ticket.seq) {
        return inner.discard(&ticket);
    }

    match result {
        Ok(artifact) => {
            let own_prefix = format!("{}-", artifact.render_id);
            let swept = {
                let mut surface = inner.surface.borrow_mut();
                surface.clear_container();
                surface.mount(&artifact.render_id, &artifact.markup);
                surface.remove_nodes(&|node: &str| node.starts_with(&own_prefix))
            };
            tracing::debug!(render_id = %ticket.id, swept, "diagram rendered");
            inner.settle(&ticket, RenderOutcome::Rendered)
        }
        Err(err) => {
            tracing::warn!(render_id = %ticket.id, error = %err, "diagram render failed");
            inner.surface.borrow_mut().clear_container();
            inner.settle(&ticket, RenderOutcome::RenderError(err.to_string()))
        }
    }
}
