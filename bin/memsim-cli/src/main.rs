// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memsim
//!
//! Command-line interface for the heap and cache simulators.
//!
//! ## Usage
//! ```bash
//! # Replay the built-in fragmentation scenario
//! memsim run --policy best-fit
//!
//! # Replay a workload file under all three placement policies
//! memsim compare --workload ./workloads/churn.toml
//!
//! # Probe a strided address pattern through the cache hierarchy
//! memsim cache --stride 64 --count 1024 --passes 2
//!
//! # Print the effective configuration
//! memsim --config memsim.toml config
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "memsim",
    about = "Heap allocator and multi-level cache simulator",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a workload and print the heap layout, statistics and cache report.
    Run {
        /// Workload TOML file (defaults to the built-in fragmentation scenario).
        #[arg(short, long)]
        workload: Option<std::path::PathBuf>,

        /// Placement policy override: first-fit, best-fit, worst-fit.
        #[arg(short, long)]
        policy: Option<String>,

        /// Print the results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replay a workload under every placement policy and compare.
    Compare {
        /// Workload TOML file (defaults to the built-in fragmentation scenario).
        #[arg(short, long)]
        workload: Option<std::path::PathBuf>,
    },

    /// Probe an address pattern through the configured cache hierarchy.
    Cache {
        /// Comma-separated addresses (decimal or 0x-prefixed hex); overrides
        /// the generated stride pattern.
        #[arg(short, long)]
        addresses: Option<String>,

        /// Distance in bytes between consecutive generated addresses.
        #[arg(long, default_value_t = 64)]
        stride: usize,

        /// Number of generated addresses.
        #[arg(long, default_value_t = 256)]
        count: usize,

        /// How many times to replay the pattern.
        #[arg(long, default_value_t = 1)]
        passes: usize,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            workload,
            policy,
            json,
        } => commands::run::execute(config, workload, policy, json),
        Commands::Compare { workload } => commands::compare::execute(config, workload),
        Commands::Cache {
            addresses,
            stride,
            count,
            passes,
            json,
        } => commands::cache::execute(config, addresses, stride, count, passes, json),
        Commands::Config => commands::config::execute(config),
    }
}
