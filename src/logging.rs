// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Log output for the binary.
//!
//! Library code only emits `tracing` events. The binary installs a `fmt` subscriber on stderr,
//! filtered by `$CODELENS_LOG` (`EnvFilter` syntax, e.g. `codelens_flow=debug`).

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CODELENS_LOG";
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Builds the filter from `$CODELENS_LOG`, falling back to `warn` when unset or unparsable.
pub fn env_filter() -> EnvFilter {
    filter_from(std::env::var(LOG_ENV).ok().as_deref())
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber. Returns `false` if one was already installed.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
