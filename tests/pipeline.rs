// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use codelens_flow::config::{EngineConfig, SecurityLevel};
use codelens_flow::model::{RenderId, RunResult, ViewTab};
use codelens_flow::render::{
    DiagramEngine, DiagramRenderer, DiagramSurface, EngineArtifact, EngineError, HostId,
    MemorySurface, NodeParent, SharedSurface,
};
use codelens_flow::schedule::{RenderOutcome, RenderPhase, RenderScheduler, SessionEnd};
use codelens_flow::view::{PanelView, ViewStateController};
use futures::future::LocalBoxFuture;
use rstest::rstest;
use serde_json::{json, Value};
use tokio::task::LocalSet;

/// Renders immediately, recording the configuration it was initialized with.
#[derive(Default)]
struct EchoEngine {
    config: RefCell<Option<EngineConfig>>,
    renders: Cell<usize>,
    surface: RefCell<Option<SharedSurface>>,
}

impl DiagramEngine for EchoEngine {
    fn initialize(&self, config: &EngineConfig) {
        *self.config.borrow_mut() = Some(config.clone());
    }

    fn validate_syntax(&self, text: &str) -> Result<(), EngineError> {
        if text.contains("-->>") {
            return Err(EngineError::new("Parse error: unexpected '-->>'"));
        }
        Ok(())
    }

    fn render_to_artifact(
        &self,
        id: &RenderId,
        text: &str,
        host: Option<HostId>,
    ) -> LocalBoxFuture<'static, Result<EngineArtifact, EngineError>> {
        self.renders.set(self.renders.get() + 1);
        if let (Some(surface), Some(host)) = (self.surface.borrow().as_ref(), host) {
            surface.borrow_mut().insert_node(NodeParent::Host(host), id.as_str(), "<svg/>");
        }
        let markup = format!(
            r##"<svg id="{id}" style="max-width: 420px;"><rect class="background" fill="#1e1e1e"/><text>{}</text></svg>"##,
            text.lines().count()
        );
        Box::pin(async move { Ok(EngineArtifact { markup }) })
    }
}

struct Pipeline {
    view: ViewStateController,
    engine: Rc<EchoEngine>,
    surface: Rc<RefCell<MemorySurface>>,
}

fn pipeline() -> Pipeline {
    let surface = MemorySurface::shared();
    let shared: SharedSurface = surface.clone();
    let engine = Rc::new(EchoEngine::default());
    *engine.surface.borrow_mut() = Some(shared.clone());
    let scheduler = RenderScheduler::new(DiagramRenderer::new(engine.clone()), shared);
    Pipeline { view: ViewStateController::new(scheduler), engine, surface }
}

async fn show_flow(pipeline: &mut Pipeline, payload: Value) -> Option<SessionEnd> {
    pipeline.view.set_payload(Some(payload));
    match pipeline.view.select_tab(ViewTab::Flow) {
        Some(task) => Some(task.finished().await),
        None => None,
    }
}

#[tokio::test]
async fn analysis_result_renders_on_the_flow_tab() {
    LocalSet::new()
        .run_until(async {
            let mut p = pipeline();
            let payload = json!({
                "explanation": [{"text": "Sums a list", "indent": 0}],
                "diagram": "flowchart TD\nA-->B",
            });

            let end = show_flow(&mut p, payload).await;
            assert_eq!(end, Some(SessionEnd::Settled(RenderOutcome::Rendered)));

            let PanelView::Flow(panel) = p.view.view() else {
                panic!("expected flow panel");
            };
            assert_eq!(panel.phase, RenderPhase::Rendered);
            assert_eq!(panel.raw_text, "flowchart TD\nA-->B");
            let markup = panel.markup.expect("mounted artifact");
            assert!(markup.contains("background:transparent"), "{markup}");
            assert!(markup.contains("max-width: 420px"), "{markup}");
            assert!(markup.contains(r#"fill="transparent""#), "{markup}");
            assert_eq!(p.surface.borrow().attached_hosts(), 0);

            let config = p.engine.config.borrow().clone().expect("engine initialized");
            assert_eq!(config.security_level, SecurityLevel::Loose);
            assert!(!config.start_on_load);
        })
        .await;
}

#[rstest]
#[case::line_objects(
    json!({"graph": ["flowchart TD", {"text": "A-->B", "indent": 1}]}),
    "flowchart TD\n  A-->B"
)]
#[case::nested_lines(
    json!({"result": {"lines": ["graph LR", "X-->Y"]}}),
    "graph LR\nX-->Y"
)]
#[case::bare_string(json!("  graph TD\nA-->B\n"), "graph TD\nA-->B")]
#[tokio::test]
async fn payload_shapes_reach_the_renderer(#[case] payload: Value, #[case] expected: &str) {
    LocalSet::new()
        .run_until(async move {
            let mut p = pipeline();
            let end = show_flow(&mut p, payload).await;
            assert_eq!(end, Some(SessionEnd::Settled(RenderOutcome::Rendered)));
            assert_eq!(p.view.diagram_text(), expected);
            assert_eq!(p.engine.renders.get(), 1);
        })
        .await;
}

#[tokio::test]
async fn empty_result_is_no_diagram() {
    LocalSet::new()
        .run_until(async {
            let mut p = pipeline();
            assert_eq!(show_flow(&mut p, json!({})).await, None);

            let PanelView::Flow(panel) = p.view.view() else {
                panic!("expected flow panel");
            };
            assert_eq!(panel.phase, RenderPhase::NoDiagram);
            assert_eq!(panel.markup, None);
            assert_eq!(panel.error, None);
            assert!(p.surface.borrow().mounted().is_none());
            assert_eq!(p.engine.renders.get(), 0);
        })
        .await;
}

#[tokio::test]
async fn engine_syntax_errors_stay_inside_the_flow_panel() {
    LocalSet::new()
        .run_until(async {
            let mut p = pipeline();
            let end = show_flow(&mut p, json!({"diagram": "flowchart TD\nA-->>B"})).await;
            assert!(matches!(
                end,
                Some(SessionEnd::Settled(RenderOutcome::ParseError(ref message)))
                    if message.contains("unexpected")
            ));

            let rendered = p.view.view().to_string();
            assert!(rendered.contains("Show error & raw diagram"), "{rendered}");
            assert!(rendered.ends_with("flowchart TD\nA-->>B"), "{rendered}");
            assert_eq!(p.engine.renders.get(), 0);

            p.view.select_tab(ViewTab::Output);
            p.view.set_run_result(Some(RunResult::local_failure("upload rejected")));
            assert_eq!(
                p.view.view().to_string(),
                "exit code:1\nstdout\n—\nstderr\nupload rejected"
            );
        })
        .await;
}
