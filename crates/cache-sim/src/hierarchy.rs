// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The multi-level cache hierarchy.
//!
//! A probe walks the levels outer to inner, paying each visited level's
//! latency. The first hit stops the walk; if every level misses, main
//! memory's latency is paid on top. Average memory access time is the
//! total cycles divided by the number of probes.
//!
//! Levels are not inclusive or exclusive by construction: each level fills
//! a line only when it is itself probed and misses, so after an L1 hit the
//! inner levels are left untouched.

use crate::{CacheError, CacheLevel, CacheLevelConfig, CacheReport, LevelReport};

/// Main-memory latency used by [`CacheHierarchy::with_default_levels`], in cycles.
pub const DEFAULT_MAIN_MEMORY_LATENCY: u64 = 100;

/// Result of one hierarchy probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProbeOutcome {
    /// Index of the level that hit, `None` if main memory served the probe.
    pub hit_level: Option<usize>,
    /// Cycles charged for this probe.
    pub cycles: u64,
}

impl ProbeOutcome {
    pub fn is_hit(&self) -> bool {
        self.hit_level.is_some()
    }
}

/// An ordered stack of cache levels in front of main memory.
///
/// # Example
/// ```
/// use cache_sim::CacheHierarchy;
///
/// // L1/L2/L3, 1/5/20 cycles, RAM 100
/// let mut caches = CacheHierarchy::with_default_levels().unwrap();
/// let first = caches.access(0x1000);
/// assert!(!first.is_hit());
/// assert_eq!(first.cycles, 126);
///
/// let second = caches.access(0x1000);
/// assert_eq!(second.hit_level, Some(0));
/// assert_eq!(second.cycles, 1);
///
/// assert_eq!(caches.report().amat_cycles, 63.5);
/// ```
#[derive(Debug, Clone)]
pub struct CacheHierarchy {
    levels: Vec<CacheLevel>,
    main_memory_latency: u64,
    access_count: u64,
    total_cycles: u64,
}

impl CacheHierarchy {
    /// Builds a hierarchy from already-constructed levels.
    ///
    /// An empty hierarchy is allowed; every probe then goes to main memory.
    pub fn new(levels: Vec<CacheLevel>, main_memory_latency: u64) -> Self {
        tracing::debug!(
            "cache hierarchy: {} levels, main memory {} cycles",
            levels.len(),
            main_memory_latency,
        );
        Self {
            levels,
            main_memory_latency,
            access_count: 0,
            total_cycles: 0,
        }
    }

    /// Builds every level from its config, failing on the first invalid one.
    pub fn from_configs(
        configs: &[CacheLevelConfig],
        main_memory_latency: u64,
    ) -> Result<Self, CacheError> {
        let levels = configs
            .iter()
            .cloned()
            .map(CacheLevel::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(levels, main_memory_latency))
    }

    /// L1/L2/L3 from [`CacheLevelConfig::default_levels`] in front of a
    /// 100-cycle main memory.
    pub fn with_default_levels() -> Result<Self, CacheError> {
        Self::from_configs(
            &CacheLevelConfig::default_levels(),
            DEFAULT_MAIN_MEMORY_LATENCY,
        )
    }

    /// Probes `address` through the hierarchy.
    pub fn access(&mut self, address: usize) -> ProbeOutcome {
        self.access_count += 1;
        let mut cycles = 0;

        for (index, level) in self.levels.iter_mut().enumerate() {
            cycles += level.latency();
            if level.access(address) {
                self.total_cycles += cycles;
                tracing::trace!("probe {address:#x}: hit in {} ({cycles} cycles)", level.name());
                return ProbeOutcome {
                    hit_level: Some(index),
                    cycles,
                };
            }
        }

        cycles += self.main_memory_latency;
        self.total_cycles += cycles;
        tracing::trace!("probe {address:#x}: miss to main memory ({cycles} cycles)");
        ProbeOutcome {
            hit_level: None,
            cycles,
        }
    }

    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    pub fn main_memory_latency(&self) -> u64 {
        self.main_memory_latency
    }

    /// Number of probes so far.
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    /// Cycles charged so far.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Average memory access time in cycles; `0.0` before any probe.
    pub fn amat(&self) -> f64 {
        if self.access_count == 0 {
            return 0.0;
        }
        self.total_cycles as f64 / self.access_count as f64
    }

    /// Builds a read-only performance report.
    pub fn report(&self) -> CacheReport {
        CacheReport {
            levels: self.levels.iter().map(LevelReport::from_level).collect(),
            total_lookups: self.access_count,
            total_cycles: self.total_cycles,
            amat_cycles: self.amat(),
        }
    }
}
