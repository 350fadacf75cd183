// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memsim run` command: replay one workload on one session.
//!
//! Prints the heap layout as it stands after the workload, then heap
//! statistics, allocation counters and the cache report. Variables still
//! bound at the end are released before exit.

use heap_sim::PlacementPolicy;
use simulator::{SimConfig, Simulation};
use std::path::PathBuf;

pub fn execute(
    mut config: SimConfig,
    workload: Option<PathBuf>,
    policy: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(p) = policy {
        config.placement = PlacementPolicy::parse(&p)?;
    }
    let workload = super::load_workload(workload)?;

    let mut sim = Simulation::new(&config)?;
    let outcome = workload.run(&mut sim);

    if json {
        let report = serde_json::json!({
            "policy": sim.policy(),
            "outcome": outcome,
            "layout": sim.layout(),
            "heap": sim.heap_stats(),
            "counters": sim.heap_counters(),
            "cache": sim.cache_report(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        sim.release_all();
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              memsim · Workload Replay               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Arena:   {} bytes", sim.heap().capacity());
    println!("  Policy:  {}", sim.policy());
    println!(
        "  Ops:     {} ({} ok, {} failed)",
        workload.ops.len(),
        outcome.succeeded,
        outcome.failed(),
    );
    for (i, msg) in &outcome.failures {
        println!("   op {i:>3}: {msg}");
    }
    println!();

    // ── Layout ─────────────────────────────────────────────────
    println!(
        "  {:<4} {:>10} {:>10} {:>10} {:<6} {}",
        "Idx", "Address", "Size", "Requested", "State", "Variable",
    );
    println!("  {}", "-".repeat(56));
    for entry in sim.layout() {
        println!(
            "  {:<4} {:>#10x} {:>10} {:>10} {:<6} {}",
            entry.index,
            entry.payload_address,
            entry.size_bytes,
            entry.requested_bytes,
            if entry.is_free { "free" } else { "used" },
            entry.variable.as_deref().unwrap_or("-"),
        );
    }
    println!();

    // ── Heap ───────────────────────────────────────────────────
    let stats = sim.heap_stats();
    let used_ratio = stats.bytes_used as f64 / stats.capacity as f64;
    println!("  Heap");
    println!(
        "   Blocks:        {} ({} used, {} free)",
        stats.total_blocks, stats.used_blocks, stats.free_blocks,
    );
    println!(
        "   Used:          {} bytes  {}",
        stats.bytes_used,
        super::usage_bar(used_ratio),
    );
    println!("   Free:          {} bytes", stats.bytes_free);
    println!("   Headers:       {} bytes", stats.header_bytes);
    println!("   Largest free:  {} bytes", stats.max_free_block_size);
    println!("   Internal waste: {} bytes", stats.internal_waste_bytes);
    println!("   Fragmentation: {:.1}%", stats.fragmentation_percent());
    println!("   {}", sim.heap_counters().summary());
    println!();

    // ── Cache ──────────────────────────────────────────────────
    println!("  Cache");
    println!("{}", sim.cache_report());
    println!();

    let released = sim.release_all();
    if released > 0 {
        println!("  Released {released} live allocations on exit.");
    }

    Ok(())
}
