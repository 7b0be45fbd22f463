// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! codelens-flow CLI entrypoint.
//!
//! Loads an analysis result, drives the output view to the selected tab and prints the resulting
//! panel. The Flow tab renders through the mermaid-cli binary (`--mmdc`, `$CODELENS_MMDC` or
//! `mmdc` from `PATH`).

use std::error::Error;
use std::rc::Rc;

use codelens_flow::model::{RunResult, ViewTab};
use codelens_flow::render::{install_engine_config, DiagramRenderer, MemorySurface, MmdcEngine};
use codelens_flow::schedule::RenderScheduler;
use codelens_flow::view::ViewStateController;
use codelens_flow::EngineConfig;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <payload.json> [--tab explain|flow|output] [--run-result <run.json>] [--config <engine.json>] [--mmdc <path>]\n\nUse `-` as payload path to read the analysis result from stdin.\n--tab selects the panel to print (default: explain).\n--config loads engine settings from JSON; missing keys keep their defaults.\n--mmdc overrides the mermaid-cli binary (default: $CODELENS_MMDC, then `mmdc`).\n\nLogs go to stderr; set CODELENS_LOG (e.g. `codelens_flow=debug`) to change the level."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    payload: Option<String>,
    tab: Option<ViewTab>,
    run_result: Option<String>,
    config: Option<String>,
    mmdc: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tab" => {
                if options.tab.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.tab = Some(raw.parse().map_err(|_| ())?);
            }
            "--run-result" => {
                if options.run_result.is_some() {
                    return Err(());
                }
                options.run_result = Some(args.next().ok_or(())?);
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--mmdc" => {
                if options.mmdc.is_some() {
                    return Err(());
                }
                options.mmdc = Some(args.next().ok_or(())?);
            }
            "-" => {
                if options.payload.is_some() {
                    return Err(());
                }
                options.payload = Some(arg);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.payload.is_some() {
                    return Err(());
                }
                options.payload = Some(arg);
            }
        }
    }

    if options.payload.is_none() {
        return Err(());
    }

    Ok(options)
}

fn read_source(path: &str) -> Result<String, Box<dyn Error>> {
    let raw = if path == "-" {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    };
    raw.map_err(|err| format!("cannot read {path}: {err}").into())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, Box<dyn Error>> {
    let raw = read_source(path)?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid JSON in {path}: {err}").into())
}

fn main() {
    codelens_flow::logging::init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "codelens-flow".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        if let Some(path) = &options.config {
            install_engine_config(EngineConfig::load(path)?);
        }

        let payload_path = options.payload.as_deref().unwrap_or("-");
        let payload: serde_json::Value = read_json(payload_path)?;
        let run_result = options.run_result.as_deref().map(read_json::<RunResult>).transpose()?;

        let engine = match &options.mmdc {
            Some(program) => MmdcEngine::new(program),
            None => MmdcEngine::from_env(),
        };
        let tab = options.tab.unwrap_or_default();

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let local = tokio::task::LocalSet::new();

        let panel = local.block_on(&runtime, async move {
            let surface = MemorySurface::shared();
            let renderer = DiagramRenderer::new(Rc::new(engine));
            let mut view = ViewStateController::new(RenderScheduler::new(renderer, surface));

            view.set_payload(Some(payload));
            view.set_run_result(run_result);
            if let Some(task) = view.select_tab(tab) {
                task.finished().await;
            }
            view.view()
        });

        println!("{panel}");
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("codelens-flow: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use codelens_flow::model::ViewTab;

    use super::{parse_options, CliOptions};

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_payload_only() {
        let options = parse_options(args(&["result.json"])).expect("parse options");
        assert_eq!(
            options,
            CliOptions { payload: Some("result.json".to_owned()), ..CliOptions::default() }
        );
    }

    #[test]
    fn parses_all_flags_in_any_order() {
        let options = parse_options(args(&[
            "--tab",
            "flow",
            "--mmdc",
            "/opt/mmdc",
            "result.json",
            "--config",
            "engine.json",
            "--run-result",
            "run.json",
        ]))
        .expect("parse options");
        assert_eq!(options.payload.as_deref(), Some("result.json"));
        assert_eq!(options.tab, Some(ViewTab::Flow));
        assert_eq!(options.mmdc.as_deref(), Some("/opt/mmdc"));
        assert_eq!(options.config.as_deref(), Some("engine.json"));
        assert_eq!(options.run_result.as_deref(), Some("run.json"));
    }

    #[test]
    fn accepts_stdin_payload() {
        let options = parse_options(args(&["-", "--tab", "output"])).expect("parse options");
        assert_eq!(options.payload.as_deref(), Some("-"));
        assert_eq!(options.tab, Some(ViewTab::Output));
    }

    #[test]
    fn rejects_missing_payload() {
        parse_options(std::iter::empty()).unwrap_err();
        parse_options(args(&["--tab", "flow"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_tab() {
        parse_options(args(&["result.json", "--tab", "graphviz"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(args(&["result.json", "--nope"])).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags_and_payloads() {
        parse_options(args(&["a.json", "b.json"])).unwrap_err();
        parse_options(args(&["a.json", "--tab", "flow", "--tab", "output"])).unwrap_err();
        parse_options(args(&["a.json", "--mmdc", "x", "--mmdc", "y"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_flag_values() {
        parse_options(args(&["a.json", "--config"])).unwrap_err();
        parse_options(args(&["a.json", "--run-result"])).unwrap_err();
    }
}
