// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Compare placement policies on a churn workload.
//!
//! Replays the same allocate/free sequence under first-, best- and
//! worst-fit at several arena sizes and prints how fragmented each heap
//! ends up, then walks the built-in scenario step by step.
//!
//! ```bash
//! cargo run -p simulator --example policy_comparison
//! ```

use simulator::{compare_policies, SimConfig, Simulation, Workload};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let workload = Workload::churn(12);
    println!("Workload: {} ops\n", workload.ops.len());

    let arenas = ["16K", "32K", "64K"];

    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>10} {:>10} {:>8}",
        "Policy", "Arena", "Failed", "Blocks", "Free", "Largest", "Frag %",
    );
    println!("{}", "-".repeat(72));

    for arena in arenas {
        let config = SimConfig {
            arena_capacity: arena.to_string(),
            ..Default::default()
        };
        for r in compare_policies(&config, &workload)? {
            println!(
                "{:<12} {:>8} {:>8} {:>8} {:>10} {:>10} {:>7.1}%",
                r.policy.name(),
                arena,
                r.outcome.failed(),
                r.stats.total_blocks,
                r.stats.bytes_free,
                r.stats.max_free_block_size,
                r.stats.fragmentation_percent(),
            );
        }
    }

    // Walk the built-in scenario and show the layout and cache report.
    println!("\n--- Fragmentation scenario (first-fit, 1M arena) ---\n");
    let mut sim = Simulation::new(&SimConfig::default())?;
    let mut scenario = Workload::fragmentation_scenario();
    // Stop before the final frees so the layout still has live blocks.
    scenario.ops.truncate(12);
    let outcome = scenario.run(&mut sim);
    println!("Ops: {} ok, {} failed\n", outcome.succeeded, outcome.failed());

    for entry in sim.layout() {
        println!(
            "  [{:>2}] {:#08x} {:>8} bytes  {:<5} {}",
            entry.index,
            entry.payload_address,
            entry.size_bytes,
            if entry.is_free { "free" } else { "used" },
            entry.variable.as_deref().unwrap_or(""),
        );
    }

    println!("\nHeap:  {}", sim.heap_stats().summary());
    println!("{}", sim.cache_report());

    let released = sim.release_all();
    println!("Released {released} allocations on exit");

    Ok(())
}
