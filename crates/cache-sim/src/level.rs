// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A single set-associative cache level.
//!
//! An address maps to a line tag (`address / line_size`) and the tag maps
//! to a set (`tag % num_sets`). Each set is searched MRU-first; on a miss
//! the LRU line of that set is replaced.

use crate::{CacheError, CacheSet};

fn default_ways() -> usize {
    4
}

/// Geometry and latency of one cache level.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheLevelConfig {
    /// Display name, e.g. `"L1 Cache"`.
    pub name: String,
    /// Total capacity in bytes.
    pub size_bytes: usize,
    /// Line (block) size in bytes.
    pub line_size: usize,
    /// Cycles charged for every probe of this level.
    pub latency: u64,
    /// Associativity.
    #[serde(default = "default_ways")]
    pub ways: usize,
}

impl CacheLevelConfig {
    /// Creates a 4-way level config.
    pub fn new(name: impl Into<String>, size_bytes: usize, line_size: usize, latency: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            line_size,
            latency,
            ways: default_ways(),
        }
    }

    /// Overrides the associativity.
    pub fn with_ways(mut self, ways: usize) -> Self {
        self.ways = ways;
        self
    }

    /// Number of sets this geometry yields (0 if the geometry is invalid).
    pub fn num_sets(&self) -> usize {
        match self.line_size.checked_mul(self.ways) {
            Some(set_bytes) if set_bytes > 0 => self.size_bytes / set_bytes,
            _ => 0,
        }
    }

    /// The classic three-level desktop hierarchy: 32 KiB / 256 KiB / 8 MiB,
    /// 64-byte lines, 1 / 5 / 20 cycles, 4-way.
    pub fn default_levels() -> Vec<CacheLevelConfig> {
        vec![
            CacheLevelConfig::new("L1 Cache", 32 * 1024, 64, 1),
            CacheLevelConfig::new("L2 Cache", 256 * 1024, 64, 5),
            CacheLevelConfig::new("L3 Cache", 8 * 1024 * 1024, 64, 20),
        ]
    }

    fn validate(&self) -> Result<(), CacheError> {
        let invalid = |detail: String| CacheError::InvalidGeometry {
            level: self.name.clone(),
            detail,
        };
        if self.line_size == 0 {
            return Err(invalid("line size must be non-zero".into()));
        }
        if self.ways == 0 {
            return Err(invalid("associativity must be non-zero".into()));
        }
        if self.num_sets() == 0 {
            return Err(invalid(format!(
                "{} bytes cannot hold one set of {} × {}-byte lines",
                self.size_bytes, self.ways, self.line_size
            )));
        }
        Ok(())
    }
}

/// One level of the hierarchy, with its sets and hit/miss counters.
///
/// # Example
/// ```
/// use cache_sim::{CacheLevel, CacheLevelConfig};
///
/// let mut l1 = CacheLevel::new(CacheLevelConfig::new("L1", 1024, 64, 1)).unwrap();
/// assert!(!l1.access(0x40));
/// assert!(l1.access(0x7f)); // same 64-byte line
/// assert_eq!((l1.hits(), l1.misses()), (1, 1));
/// ```
#[derive(Debug, Clone)]
pub struct CacheLevel {
    config: CacheLevelConfig,
    num_sets: usize,
    sets: Vec<CacheSet>,
    hits: u64,
    misses: u64,
}

impl CacheLevel {
    /// Builds a level, rejecting geometries with zero sets.
    pub fn new(config: CacheLevelConfig) -> Result<Self, CacheError> {
        config.validate()?;
        let num_sets = config.num_sets();
        let sets = (0..num_sets).map(|_| CacheSet::new(config.ways)).collect();
        tracing::debug!(
            "cache level '{}': {} sets × {} ways × {} B lines, {} cycles",
            config.name,
            num_sets,
            config.ways,
            config.line_size,
            config.latency,
        );
        Ok(Self {
            config,
            num_sets,
            sets,
            hits: 0,
            misses: 0,
        })
    }

    /// Probes `address`. Returns `true` on a hit.
    pub fn access(&mut self, address: usize) -> bool {
        let tag = self.tag_of(address);
        let set_index = tag % self.num_sets;
        let hit = self.sets[set_index].access(tag);
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        hit
    }

    /// Whether the line holding `address` is resident, without updating
    /// recency or counters.
    pub fn contains(&self, address: usize) -> bool {
        let tag = self.tag_of(address);
        self.sets[tag % self.num_sets].contains(tag)
    }

    fn tag_of(&self, address: usize) -> usize {
        address / self.config.line_size
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn latency(&self) -> u64 {
        self.config.latency
    }

    pub fn config(&self) -> &CacheLevelConfig {
        &self.config
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// The set at `index`, MRU line first.
    pub fn set(&self, index: usize) -> Option<&CacheSet> {
        self.sets.get(index)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Probes seen by this level.
    pub fn requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate in `[0.0, 1.0]`; `0.0` before any request.
    pub fn hit_rate(&self) -> f64 {
        let requests = self.requests();
        if requests == 0 {
            return 0.0;
        }
        self.hits as f64 / requests as f64
    }
}
