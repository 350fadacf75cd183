// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memsim compare` command: one workload, every placement policy.
//!
//! Each policy replays the workload on a fresh session built from the same
//! configuration, so the rows differ only in where blocks were placed.

use simulator::{compare_policies, SimConfig};
use std::path::PathBuf;

pub fn execute(config: SimConfig, workload: Option<PathBuf>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           memsim · Placement Policy Comparison      ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let workload = super::load_workload(workload)?;
    println!("  Arena:     {}", config.parse_capacity()?);
    println!("  Ops:       {}", workload.ops.len());
    println!();

    let results = compare_policies(&config, &workload)?;

    // ── Results Table ──────────────────────────────────────────
    println!(
        "  {:<10} {:>7} {:>7} {:>8} {:>10} {:>10} {:>8} {:>7}",
        "Policy", "Failed", "Blocks", "Free#", "Free B", "Largest", "Frag %", "AMAT",
    );
    println!("  {}", "-".repeat(76));

    for r in &results {
        println!(
            "  {:<10} {:>7} {:>7} {:>8} {:>10} {:>10} {:>7.1}% {:>7.2}",
            r.policy.name(),
            r.outcome.failed(),
            r.stats.total_blocks,
            r.stats.free_blocks,
            r.stats.bytes_free,
            r.stats.max_free_block_size,
            r.stats.fragmentation_percent(),
            r.amat_cycles,
        );
    }
    println!();

    // ── Summary ────────────────────────────────────────────────
    let fewest_failures = results.iter().min_by_key(|r| r.outcome.failed());
    let least_fragmented = results
        .iter()
        .min_by(|a, b| a.stats.fragmentation.total_cmp(&b.stats.fragmentation));

    if let (Some(ff), Some(lf)) = (fewest_failures, least_fragmented) {
        println!("  Summary:");
        println!(
            "   Fewest failures:   {} ({} failed ops)",
            ff.policy,
            ff.outcome.failed(),
        );
        println!(
            "   Least fragmented:  {} ({:.1}%)",
            lf.policy,
            lf.stats.fragmentation_percent(),
        );
        println!();
    }

    for r in &results {
        println!("  {:<10} {}", r.policy.name(), r.counters.summary());
    }

    Ok(())
}
