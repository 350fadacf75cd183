// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # cache-sim
//!
//! A multi-level, set-associative cache simulator with LRU replacement,
//! used to estimate average memory access time (AMAT) for an address
//! stream.
//!
//! # Key Components
//!
//! - [`CacheLine`] / [`CacheSet`]: valid bit + tag, kept MRU-to-LRU per set.
//! - [`CacheLevel`]: one level: `size / (line_size × ways)` sets, a latency,
//!   and hit/miss counters. Built from a [`CacheLevelConfig`].
//! - [`CacheHierarchy`]: levels probed outer to inner; accumulates cycles
//!   and produces a [`CacheReport`].
//!
//! # Address Mapping
//!
//! ```text
//!   address ──► tag = address / line_size ──► set = tag % num_sets
//!                                                  │
//!                         ┌────────────────────────┘
//!                         ▼
//!              [ MRU  line  line  ...  LRU ]   hit: move to front
//!                                              miss: drop back, push front
//! ```
//!
//! # Example
//! ```
//! use cache_sim::{CacheHierarchy, CacheLevelConfig};
//!
//! let mut caches = CacheHierarchy::from_configs(
//!     &[
//!         CacheLevelConfig::new("L1", 32 * 1024, 64, 1),
//!         CacheLevelConfig::new("L2", 256 * 1024, 64, 5),
//!     ],
//!     100,
//! )
//! .unwrap();
//!
//! for addr in (0..4096).step_by(8) {
//!     caches.access(addr);
//! }
//! println!("{}", caches.report());
//! ```

mod error;
mod hierarchy;
mod level;
mod report;
mod set;

pub use error::CacheError;
pub use hierarchy::{CacheHierarchy, ProbeOutcome, DEFAULT_MAIN_MEMORY_LATENCY};
pub use level::{CacheLevel, CacheLevelConfig};
pub use report::{CacheReport, LevelReport};
pub use set::{CacheLine, CacheSet};
