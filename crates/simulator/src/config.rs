// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Simulation configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! arena_capacity = "1M"
//! placement = "first-fit"
//! main_memory_latency = 100
//!
//! [[cache_levels]]
//! name = "L1 Cache"
//! size_bytes = 32768
//! line_size = 64
//! latency = 1
//! ways = 4
//! ```
//!
//! Omitted keys take the defaults of [`SimConfig::default`].

use crate::SimError;
use cache_sim::{CacheHierarchy, CacheLevelConfig, DEFAULT_MAIN_MEMORY_LATENCY};
use heap_sim::{ArenaCapacity, HeapAllocator, PlacementPolicy};
use std::path::Path;

/// Configuration for one simulation session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Arena size (human-readable, e.g. `"1M"`).
    pub arena_capacity: String,
    /// Starting placement policy.
    pub placement: PlacementPolicy,
    /// Cycles charged when every cache level misses.
    pub main_memory_latency: u64,
    /// Cache levels, outer (L1) first.
    pub cache_levels: Vec<CacheLevelConfig>,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SimError> {
        toml::from_str(toml_str)
            .map_err(|e| SimError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, SimError> {
        toml::to_string_pretty(self)
            .map_err(|e| SimError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses the arena capacity string.
    pub fn parse_capacity(&self) -> Result<ArenaCapacity, SimError> {
        ArenaCapacity::parse(&self.arena_capacity)
            .map_err(|e| SimError::ConfigError(format!("invalid arena capacity: {e}")))
    }

    /// Builds the heap described by this config.
    pub fn build_heap(&self) -> Result<HeapAllocator, SimError> {
        Ok(HeapAllocator::with_policy(self.parse_capacity()?, self.placement)?)
    }

    /// Builds the cache hierarchy described by this config.
    pub fn build_cache(&self) -> Result<CacheHierarchy, SimError> {
        Ok(CacheHierarchy::from_configs(
            &self.cache_levels,
            self.main_memory_latency,
        )?)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_capacity: "1M".to_string(),
            placement: PlacementPolicy::FirstFit,
            main_memory_latency: DEFAULT_MAIN_MEMORY_LATENCY,
            cache_levels: CacheLevelConfig::default_levels(),
        }
    }
}
