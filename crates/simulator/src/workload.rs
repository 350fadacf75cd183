// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scripted, deterministic workloads and placement-policy comparison.
//!
//! A [`Workload`] is a list of [`Op`]s replayed against a [`Simulation`].
//! Failed ops are counted and logged, and the replay carries on, so a
//! workload that runs out of memory under one policy still produces a full
//! set of statistics to compare against the others.
//!
//! # TOML Format
//! ```toml
//! [[ops]]
//! op = "allocate"
//! name = "a"
//! size = 100
//!
//! [[ops]]
//! op = "access"
//! name = "a"
//!
//! [[ops]]
//! op = "free"
//! name = "a"
//! ```

use crate::{SimConfig, SimError, Simulation};
use heap_sim::{AllocationCounters, HeapStats, PlacementPolicy};
use std::path::Path;

/// One workload step.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Op {
    Allocate { name: String, size: usize },
    Free { name: String },
    Access { name: String },
    SetPolicy { policy: PlacementPolicy },
}

impl Op {
    fn apply(&self, sim: &mut Simulation) -> Result<(), SimError> {
        match self {
            Op::Allocate { name, size } => sim.allocate(name, *size).map(|_| ()),
            Op::Free { name } => sim.free(name),
            Op::Access { name } => sim.access(name).map(|_| ()),
            Op::SetPolicy { policy } => {
                sim.set_policy(*policy);
                Ok(())
            }
        }
    }
}

/// An ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub ops: Vec<Op>,
}

/// What happened when a workload was replayed.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct WorkloadOutcome {
    /// Ops that completed.
    pub succeeded: usize,
    /// `(op index, error message)` for every op that failed.
    pub failures: Vec<(usize, String)>,
}

impl WorkloadOutcome {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl Workload {
    pub fn new(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Loads a workload from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimError::ConfigError(format!("cannot read workload '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses a workload from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SimError> {
        toml::from_str(toml_str)
            .map_err(|e| SimError::ConfigError(format!("workload parse error: {e}")))
    }

    /// Serialises the workload to TOML.
    pub fn to_toml(&self) -> Result<String, SimError> {
        toml::to_string_pretty(self)
            .map_err(|e| SimError::ConfigError(format!("workload serialise error: {e}")))
    }

    /// Replays every op against `sim`, continuing past failures.
    pub fn run(&self, sim: &mut Simulation) -> WorkloadOutcome {
        let mut outcome = WorkloadOutcome::default();
        for (i, op) in self.ops.iter().enumerate() {
            match op.apply(sim) {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    tracing::warn!("op {i} ({op:?}) failed: {e}");
                    outcome.failures.push((i, e.to_string()));
                }
            }
        }
        outcome
    }

    /// The built-in scenario: three blocks, a hole punched in the middle,
    /// a smaller block placed into the heap, then everything released.
    /// Cache accesses are interleaved so the hierarchy sees reuse.
    pub fn fragmentation_scenario() -> Self {
        let alloc = |name: &str, size| Op::Allocate {
            name: name.into(),
            size,
        };
        let free = |name: &str| Op::Free { name: name.into() };
        let access = |name: &str| Op::Access { name: name.into() };

        Self::new(vec![
            alloc("a", 100),
            alloc("b", 200),
            alloc("c", 50),
            access("a"),
            access("b"),
            access("a"),
            free("b"),
            alloc("d", 120),
            alloc("e", 1000),
            access("d"),
            access("c"),
            access("d"),
            free("a"),
            free("c"),
            free("d"),
            free("e"),
        ])
    }

    /// A churn workload of `rounds` rounds: each round allocates blocks of
    /// varying size, then frees every other live block. Deterministic.
    pub fn churn(rounds: usize) -> Self {
        let mut ops = Vec::new();
        let mut live: Vec<String> = Vec::new();
        let mut next = 0usize;

        for round in 0..rounds {
            for k in 0..6 {
                let name = format!("r{round}_{k}");
                // Sizes cycle through 48..=1008 in uneven steps.
                let size = 48 + ((next * 97 + k * 211) % 961);
                next += 1;
                ops.push(Op::Allocate {
                    name: name.clone(),
                    size,
                });
                ops.push(Op::Access { name: name.clone() });
                live.push(name);
            }
            let mut keep = Vec::new();
            for (i, name) in live.drain(..).enumerate() {
                if i % 2 == 0 {
                    ops.push(Op::Free { name });
                } else {
                    keep.push(name);
                }
            }
            live = keep;
        }
        Self::new(ops)
    }
}

/// Result of running one workload under one placement policy.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PolicyComparison {
    pub policy: PlacementPolicy,
    pub outcome: WorkloadOutcome,
    /// Heap state after the workload.
    pub stats: HeapStats,
    pub counters: AllocationCounters,
    pub amat_cycles: f64,
}

/// Replays `workload` once per placement policy, each on a fresh session
/// built from `config` (its `placement` is overridden).
pub fn compare_policies(
    config: &SimConfig,
    workload: &Workload,
) -> Result<Vec<PolicyComparison>, SimError> {
    PlacementPolicy::ALL
        .into_iter()
        .map(|policy| {
            let config = SimConfig {
                placement: policy,
                ..config.clone()
            };
            let mut sim = Simulation::new(&config)?;
            let outcome = workload.run(&mut sim);
            tracing::info!(
                "{policy}: {} ops ok, {} failed",
                outcome.succeeded,
                outcome.failed()
            );
            Ok(PolicyComparison {
                policy,
                outcome,
                stats: sim.heap_stats(),
                counters: sim.heap_counters().clone(),
                amat_cycles: sim.cache_report().amat_cycles,
            })
        })
        .collect()
}
