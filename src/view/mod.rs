// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! View state for the output panel.
//!
//! The controller decides which panel is mounted and is the only thing that starts or tears down
//! render sessions: leaving Flow always tears the scheduler down before the switch, entering Flow
//! always starts a fresh session from the current diagram text.

pub mod panel;

use serde_json::Value;

use crate::model::{ResultPayload, RunResult, ViewTab};
use crate::normalize::Normalizer;
use crate::schedule::{RenderScheduler, RenderTask};

pub use panel::{explanation_of, render_explanation, FlowPanel, OutputPanel, PanelView};

#[derive(Debug)]
pub struct ViewStateController {
    scheduler: RenderScheduler,
    normalizer: Normalizer,
    active_tab: ViewTab,
    payload: Option<ResultPayload>,
    diagram_text: String,
    diagram_strategy: Option<&'static str>,
    run_result: Option<RunResult>,
    loading: bool,
    request_error: Option<String>,
    rev: u64,
}

impl ViewStateController {
    pub fn new(scheduler: RenderScheduler) -> Self {
        Self::with_normalizer(scheduler, Normalizer::standard())
    }

    pub fn with_normalizer(scheduler: RenderScheduler, normalizer: Normalizer) -> Self {
        Self {
            scheduler,
            normalizer,
            active_tab: ViewTab::default(),
            payload: None,
            diagram_text: String::new(),
            diagram_strategy: None,
            run_result: None,
            loading: false,
            request_error: None,
            rev: 0,
        }
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn active_tab(&self) -> ViewTab {
        self.active_tab
    }

    pub fn payload(&self) -> Option<&ResultPayload> {
        self.payload.as_ref()
    }

    pub fn diagram_text(&self) -> &str {
        &self.diagram_text
    }

    /// Name of the normalization strategy that found the current diagram text.
    pub fn diagram_strategy(&self) -> Option<&'static str> {
        self.diagram_strategy
    }

    pub fn run_result(&self) -> Option<&RunResult> {
        self.run_result.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn request_error(&self) -> Option<&str> {
        self.request_error.as_deref()
    }

    /// Bumped on every visible state change.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    fn bump(&mut self) {
        self.rev = self.rev.wrapping_add(1);
    }

    /// Switches panels. Returns the render session started by entering Flow, if any.
    pub fn select_tab(&mut self, tab: ViewTab) -> Option<RenderTask> {
        if tab == self.active_tab {
            return None;
        }

        if self.active_tab == ViewTab::Flow {
            self.scheduler.teardown();
        }
        tracing::debug!(from = %self.active_tab, to = %tab, "tab switched");
        self.active_tab = tab;
        self.bump();

        if tab == ViewTab::Flow {
            self.scheduler.schedule(&self.diagram_text)
        } else {
            None
        }
    }

    /// Replaces the analysis result. While Flow is active the new result always gets a fresh
    /// session, even when its diagram text did not change.
    pub fn set_payload(&mut self, payload: Option<ResultPayload>) -> Option<RenderTask> {
        let extraction = payload.as_ref().and_then(|payload| self.normalizer.extract(payload));
        if extraction.is_none() {
            if let Some(payload) = payload.as_ref().filter(|payload| is_non_empty_mapping(payload)) {
                let keys = payload
                    .as_object()
                    .map(|fields| fields.keys().cloned().collect::<Vec<_>>().join(","))
                    .unwrap_or_default();
                tracing::warn!(keys = %keys, "analysis result carries no recognizable diagram");
            }
        }

        let (strategy, text) = match extraction {
            Some(extraction) => (Some(extraction.strategy), extraction.text),
            None => (None, String::new()),
        };
        if let Some(strategy) = strategy {
            tracing::debug!(strategy, "diagram text extracted");
        }
        self.diagram_strategy = strategy;
        self.diagram_text = text;
        self.payload = payload;
        self.bump();

        if self.active_tab == ViewTab::Flow {
            self.scheduler.schedule(&self.diagram_text)
        } else {
            None
        }
    }

    pub fn set_run_result(&mut self, run_result: Option<RunResult>) {
        self.run_result = run_result;
        self.bump();
    }

    /// Marks an analysis request as pending. Does not touch the scheduler.
    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.bump();
        }
    }

    /// Does not touch the scheduler.
    pub fn set_request_error(&mut self, error: Option<String>) {
        self.request_error = error;
        self.bump();
    }

    pub fn view(&self) -> PanelView {
        if self.loading {
            return PanelView::Working;
        }
        if let Some(error) = &self.request_error {
            return PanelView::RequestError(error.clone());
        }

        match self.active_tab {
            ViewTab::Explanation => {
                PanelView::Explanation(render_explanation(explanation_of(self.payload.as_ref())))
            }
            ViewTab::Flow => {
                let status = self.scheduler.status();
                let markup = self
                    .scheduler
                    .surface()
                    .borrow()
                    .mounted()
                    .map(|node| node.markup.clone());
                PanelView::Flow(FlowPanel {
                    phase: status.phase,
                    markup,
                    error: status.message,
                    raw_text: self.diagram_text.clone(),
                })
            }
            ViewTab::Output => PanelView::Output(OutputPanel::from_run(self.run_result.as_ref())),
        }
    }
}

impl Drop for ViewStateController {
    fn drop(&mut self) {
        self.scheduler.teardown();
    }
}

fn is_non_empty_mapping(payload: &Value) -> bool {
    payload.as_object().is_some_and(|fields| !fields.is_empty())
}
