// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The simulation session: a heap, a cache hierarchy and named allocations.
//!
//! The heap and the cache know nothing about each other. [`Simulation`] is
//! the client that ties them together: it remembers which name is bound to
//! which heap address and feeds those addresses into the cache when a named
//! allocation is accessed.

use crate::{SimConfig, SimError};
use cache_sim::{CacheHierarchy, CacheReport, ProbeOutcome};
use heap_sim::{AllocationCounters, HeapAllocator, HeapStats, PlacementPolicy};
use std::collections::BTreeMap;

/// One chunk of the heap layout, labelled with its variable name if bound.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LayoutEntry {
    pub index: usize,
    pub payload_address: usize,
    pub size_bytes: usize,
    pub requested_bytes: usize,
    pub is_free: bool,
    pub variable: Option<String>,
}

/// A heap plus a cache hierarchy, driven through named allocations.
///
/// # Example
/// ```
/// use simulator::{SimConfig, Simulation};
///
/// let mut sim = Simulation::new(&SimConfig::default()).unwrap();
/// sim.allocate("buf", 256).unwrap();
///
/// assert!(!sim.access("buf").unwrap().is_hit()); // cold miss
/// assert!(sim.access("buf").unwrap().is_hit());
///
/// sim.free("buf").unwrap();
/// assert_eq!(sim.heap_stats().used_blocks, 0);
/// ```
#[derive(Debug)]
pub struct Simulation {
    heap: HeapAllocator,
    cache: CacheHierarchy,
    variables: BTreeMap<String, usize>,
}

impl Simulation {
    /// Builds a session from a configuration.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let heap = config.build_heap()?;
        let cache = config.build_cache()?;
        tracing::info!(
            "simulation ready: {} byte arena ({}), {} cache levels",
            heap.capacity(),
            heap.policy(),
            cache.levels().len(),
        );
        Ok(Self::from_parts(heap, cache))
    }

    /// Builds a session around an existing heap and cache.
    pub fn from_parts(heap: HeapAllocator, cache: CacheHierarchy) -> Self {
        Self {
            heap,
            cache,
            variables: BTreeMap::new(),
        }
    }

    /// Allocates `size` bytes and binds the address to `name`.
    pub fn allocate(&mut self, name: &str, size: usize) -> Result<usize, SimError> {
        if let Some(&address) = self.variables.get(name) {
            return Err(SimError::VariableInUse {
                name: name.to_string(),
                address,
            });
        }
        let address = self.heap.allocate(size)?;
        self.variables.insert(name.to_string(), address);
        tracing::debug!("{name} = {address:#x} ({size} bytes)");
        Ok(address)
    }

    /// Frees the allocation bound to `name` and removes the binding.
    ///
    /// The binding survives if the heap rejects the free.
    pub fn free(&mut self, name: &str) -> Result<(), SimError> {
        let address = self.address_of(name)?;
        self.heap.free(address)?;
        self.variables.remove(name);
        Ok(())
    }

    /// Probes the cache with the address bound to `name`.
    pub fn access(&mut self, name: &str) -> Result<ProbeOutcome, SimError> {
        let address = self.address_of(name)?;
        let outcome = self.cache.access(address);
        tracing::debug!(
            "access {name} @ {address:#x}: {} ({} cycles)",
            if outcome.is_hit() { "hit" } else { "miss" },
            outcome.cycles,
        );
        Ok(outcome)
    }

    /// Probes the cache with a raw address.
    pub fn probe(&mut self, address: usize) -> ProbeOutcome {
        self.cache.access(address)
    }

    /// Switches the heap's placement policy.
    pub fn set_policy(&mut self, policy: PlacementPolicy) {
        self.heap.set_policy(policy);
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.heap.policy()
    }

    /// Returns the address bound to `name`.
    pub fn address_of(&self, name: &str) -> Result<usize, SimError> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownVariable(name.to_string()))
    }

    /// Bound variables in name order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, usize)> {
        self.variables.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Every chunk in address order, labelled with bound variable names.
    pub fn layout(&self) -> Vec<LayoutEntry> {
        let by_address: BTreeMap<usize, &str> = self
            .variables
            .iter()
            .map(|(name, &addr)| (addr, name.as_str()))
            .collect();

        self.heap
            .layout()
            .into_iter()
            .map(|c| LayoutEntry {
                index: c.index,
                payload_address: c.payload_address,
                size_bytes: c.size_bytes,
                requested_bytes: c.requested_bytes,
                is_free: c.is_free,
                variable: if c.is_free {
                    None
                } else {
                    by_address.get(&c.payload_address).map(|s| s.to_string())
                },
            })
            .collect()
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    pub fn heap_counters(&self) -> &AllocationCounters {
        self.heap.counters()
    }

    pub fn cache_report(&self) -> CacheReport {
        self.cache.report()
    }

    pub fn heap(&self) -> &HeapAllocator {
        &self.heap
    }

    pub fn cache(&self) -> &CacheHierarchy {
        &self.cache
    }

    /// Frees every bound variable and returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let bindings = std::mem::take(&mut self.variables);
        let mut released = 0;
        for (name, address) in bindings {
            match self.heap.free(address) {
                Ok(()) => released += 1,
                Err(e) => tracing::warn!("could not release {name}: {e}"),
            }
        }
        tracing::info!("released {released} allocations");
        released
    }
}
