// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # simulator
//!
//! Ties the heap simulator and the cache simulator together.
//!
//! The simulator takes:
//! - A [`SimConfig`] (arena size, placement policy, cache geometry), from
//!   TOML or built in code.
//! - A [`Workload`] of named allocate / free / access steps.
//!
//! and replays the workload on a [`Simulation`], which owns one
//! `HeapAllocator` and one `CacheHierarchy` and is the only place where heap
//! addresses are turned into cache probes.
//!
//! ```text
//!   Workload ──► Simulation ──┬──► HeapAllocator   (allocate / free)
//!                             │
//!                             └──► CacheHierarchy  (access → probe)
//! ```
//!
//! [`compare_policies`] replays one workload under first-, best- and
//! worst-fit on fresh sessions, for side-by-side fragmentation numbers.

mod config;
mod error;
mod session;
mod workload;

pub use config::SimConfig;
pub use error::SimError;
pub use session::{LayoutEntry, Simulation};
pub use workload::{compare_policies, Op, PolicyComparison, Workload, WorkloadOutcome};
