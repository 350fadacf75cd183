// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cache performance reports.
//!
//! [`CacheReport`] is a plain-data snapshot of a [`CacheHierarchy`]: per
//! level hit/miss counts and hit rate, plus overall lookups and AMAT. It
//! serialises to JSON for tooling and renders as a table for the CLI.
//!
//! [`CacheHierarchy`]: crate::CacheHierarchy

use crate::CacheLevel;
use std::fmt;

/// Counters for one level.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LevelReport {
    pub name: String,
    pub requests: u64,
    pub hits: u64,
    pub misses: u64,
    /// `hits / requests × 100`, `0.0` with no requests.
    pub hit_rate_percent: f64,
}

impl LevelReport {
    pub(crate) fn from_level(level: &CacheLevel) -> Self {
        Self {
            name: level.name().to_string(),
            requests: level.requests(),
            hits: level.hits(),
            misses: level.misses(),
            hit_rate_percent: level.hit_rate() * 100.0,
        }
    }
}

/// Aggregate report for a whole hierarchy.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CacheReport {
    pub levels: Vec<LevelReport>,
    /// Probes issued to the hierarchy.
    pub total_lookups: u64,
    pub total_cycles: u64,
    /// Average memory access time, `0.0` with no lookups.
    pub amat_cycles: f64,
}

impl CacheReport {
    /// Hits across all levels.
    pub fn total_hits(&self) -> u64 {
        self.levels.iter().map(|l| l.hits).sum()
    }

    /// Probes that fell through to main memory.
    pub fn memory_accesses(&self) -> u64 {
        self.total_lookups - self.total_hits()
    }

    /// Returns a one-line summary suitable for logs.
    pub fn summary(&self) -> String {
        let per_level = self
            .levels
            .iter()
            .map(|l| format!("{} {:.2}%", l.name, l.hit_rate_percent))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Cache: {} lookups, {} to memory, AMAT {:.2} cycles [{}]",
            self.total_lookups,
            self.memory_accesses(),
            self.amat_cycles,
            per_level,
        )
    }
}

impl fmt::Display for CacheReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {:<12} {:>10} {:>10} {:>10} {:>10}",
            "Level", "Requests", "Hits", "Misses", "Hit rate"
        )?;
        writeln!(f, "  {}", "-".repeat(56))?;
        for l in &self.levels {
            writeln!(
                f,
                "  {:<12} {:>10} {:>10} {:>10} {:>9.2}%",
                l.name, l.requests, l.hits, l.misses, l.hit_rate_percent
            )?;
        }
        writeln!(f, "  {}", "-".repeat(56))?;
        writeln!(f, "  Total lookups:  {}", self.total_lookups)?;
        write!(f, "  AMAT:           {:.2} cycles", self.amat_cycles)
    }
}
