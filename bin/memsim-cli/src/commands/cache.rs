// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memsim cache` command: push an address pattern through the hierarchy.
//!
//! The pattern is either an explicit address list or `count` addresses
//! `stride` bytes apart starting at zero, replayed `passes` times.

use simulator::SimConfig;

pub fn execute(
    config: SimConfig,
    addresses: Option<String>,
    stride: usize,
    count: usize,
    passes: usize,
    json: bool,
) -> anyhow::Result<()> {
    let pattern = match addresses {
        Some(list) => parse_addresses(&list)?,
        None => strided(stride, count)?,
    };

    let mut cache = config.build_cache()?;
    for _ in 0..passes {
        for &address in &pattern {
            cache.access(address);
        }
    }
    let report = cache.report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             memsim · Cache Hierarchy Probe          ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Geometry ───────────────────────────────────────────────
    println!(
        "  {:<12} {:>10} {:>6} {:>6} {:>6} {:>8}",
        "Level", "Size", "Line", "Ways", "Sets", "Latency",
    );
    println!("  {}", "-".repeat(54));
    for level in cache.levels() {
        let c = level.config();
        println!(
            "  {:<12} {:>10} {:>6} {:>6} {:>6} {:>8}",
            c.name,
            c.size_bytes,
            c.line_size,
            c.ways,
            level.num_sets(),
            c.latency,
        );
    }
    println!(
        "  {:<12} {:>41}",
        "Memory",
        cache.main_memory_latency(),
    );
    println!();

    println!(
        "  Pattern: {} addresses × {} passes = {} lookups",
        pattern.len(),
        passes,
        report.total_lookups,
    );
    println!();
    println!("{report}");
    println!();
    println!("  {}", report.summary());

    Ok(())
}

/// Parses a comma-separated list of decimal or `0x` hex addresses.
fn parse_addresses(list: &str) -> anyhow::Result<Vec<usize>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => usize::from_str_radix(hex, 16),
                None => s.parse(),
            };
            parsed.map_err(|e| anyhow::anyhow!("invalid address '{s}': {e}"))
        })
        .collect()
}

/// `count` addresses `stride` bytes apart, starting at zero.
fn strided(stride: usize, count: usize) -> anyhow::Result<Vec<usize>> {
    (0..count)
        .map(|i| {
            i.checked_mul(stride).ok_or_else(|| {
                anyhow::anyhow!("address {i} × stride {stride} overflows the address space")
            })
        })
        .collect()
}
