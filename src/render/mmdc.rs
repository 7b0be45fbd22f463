// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Engine adapter for the mermaid-cli (`mmdc`) binary.
//!
//! Each render runs `mmdc` headless in its own scratch directory. The child process is killed if
//! the render future is dropped, so cancelled sessions do not leave renders running.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::LocalBoxFuture;
use tokio::process::Command;

use super::engine::{DiagramEngine, EngineArtifact, EngineError};
use super::surface::HostId;
use crate::config::EngineConfig;
use crate::model::RenderId;

pub const MMDC_ENV: &str = "CODELENS_MMDC";
const DEFAULT_PROGRAM: &str = "mmdc";

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct MmdcEngine {
    program: PathBuf,
    config_json: RefCell<Option<String>>,
}

impl MmdcEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), config_json: RefCell::new(None) }
    }

    /// Uses `$CODELENS_MMDC` when set, `mmdc` from `PATH` otherwise.
    pub fn from_env() -> Self {
        let program = std::env::var_os(MMDC_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));
        Self::new(program)
    }
}

impl DiagramEngine for MmdcEngine {
    fn initialize(&self, config: &EngineConfig) {
        *self.config_json.borrow_mut() = Some(config.to_json());
    }

    // mmdc has no parse-only mode; grammar errors surface from the render call instead.
    fn validate_syntax(&self, _text: &str) -> Result<(), EngineError> {
        Ok(())
    }

    fn render_to_artifact(
        &self,
        id: &RenderId,
        text: &str,
        _host: Option<HostId>,
    ) -> LocalBoxFuture<'static, Result<EngineArtifact, EngineError>> {
        let job = MmdcJob {
            program: self.program.clone(),
            config_json: self.config_json.borrow().clone(),
            svg_id: id.to_string(),
            text: text.to_owned(),
            scratch: scratch_dir(),
        };
        Box::pin(job.run())
    }
}

fn scratch_dir() -> PathBuf {
    let counter = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("codelens-flow-{}-{counter}", std::process::id()))
}

struct MmdcJob {
    program: PathBuf,
    config_json: Option<String>,
    svg_id: String,
    text: String,
    scratch: PathBuf,
}

impl MmdcJob {
    async fn run(self) -> Result<EngineArtifact, EngineError> {
        let result = self.render_in_scratch().await;
        let _ = tokio::fs::remove_dir_all(&self.scratch).await;
        result
    }

    async fn render_in_scratch(&self) -> Result<EngineArtifact, EngineError> {
        let io_err = |what: &str, err: std::io::Error| EngineError::new(format!("{what}: {err}"));

        tokio::fs::create_dir_all(&self.scratch)
            .await
            .map_err(|err| io_err("cannot create scratch dir", err))?;

        let input = self.scratch.join("diagram.mmd");
        let output = self.scratch.join("diagram.svg");
        tokio::fs::write(&input, &self.text)
            .await
            .map_err(|err| io_err("cannot write diagram source", err))?;

        let mut command = Command::new(&self.program);
        command
            .arg("--quiet")
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .arg("--svgId")
            .arg(&self.svg_id)
            .arg("--backgroundColor")
            .arg("transparent")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(config_json) = &self.config_json {
            let config_path = self.scratch.join("config.json");
            tokio::fs::write(&config_path, config_json)
                .await
                .map_err(|err| io_err("cannot write engine config", err))?;
            command.arg("--configFile").arg(config_path);
        }

        tracing::debug!(program = ?self.program, svg_id = %self.svg_id, "running mmdc");
        let out = command.output().await.map_err(|err| {
            io_err(&format!("cannot run {}", self.program.display()), err)
        })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let message = stderr.trim();
            return Err(EngineError::new(if message.is_empty() {
                format!("mmdc exited with {}", out.status)
            } else {
                message.to_owned()
            }));
        }

        let markup = tokio::fs::read_to_string(&output)
            .await
            .map_err(|err| io_err("cannot read rendered svg", err))?;
        Ok(EngineArtifact { markup })
    }
}
