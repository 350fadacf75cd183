// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI plumbing.

pub mod cache;
pub mod compare;
pub mod config;
pub mod run;

use simulator::{SimConfig, Workload};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Loads the config file if one was given, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SimConfig> {
    match path {
        Some(p) => {
            let config = SimConfig::from_file(p)?;
            tracing::info!("loaded config from {}", p.display());
            Ok(config)
        }
        None => Ok(SimConfig::default()),
    }
}

/// Loads a workload file, or the built-in scenario when none is given.
pub fn load_workload(path: Option<PathBuf>) -> anyhow::Result<Workload> {
    match path {
        Some(p) => Workload::from_file(&p)
            .map_err(|e| anyhow::anyhow!("failed to load workload '{}': {e}", p.display())),
        None => Ok(Workload::fragmentation_scenario()),
    }
}

/// Creates a visual usage bar (0.0-1.0 scale).
pub fn usage_bar(ratio: f64) -> String {
    let filled = (ratio * 20.0).round() as usize;
    let filled = filled.min(20);
    let empty = 20 - filled;
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_bar_bounds() {
        assert_eq!(usage_bar(0.0), format!("[{}]", ".".repeat(20)));
        assert_eq!(usage_bar(1.0), format!("[{}]", "#".repeat(20)));
        assert_eq!(usage_bar(2.0).len(), 22);
    }

    #[test]
    fn test_default_workload_is_builtin_scenario() {
        let w = load_workload(None).unwrap();
        assert_eq!(w, Workload::fragmentation_scenario());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/memsim.toml"))).is_err());
        assert_eq!(load_config(None).unwrap(), SimConfig::default());
    }
}
