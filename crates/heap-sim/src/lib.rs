// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # heap-sim
//!
//! A simulated heap allocator over a fixed-size arena, for comparing
//! placement strategies and watching fragmentation happen.
//!
//! # Key Components
//!
//! - [`ArenaCapacity`]: the arena size, with human-readable parsing
//!   (`"1M"`, `"64K"`, etc.).
//! - [`HeapAllocator`]: the allocator: an address-ordered free list of
//!   [`ChunkRecord`]s that tiles the arena, with splitting on allocate and
//!   coalescing on free.
//! - [`PlacementPolicy`] / [`PlacementStrategy`]: first-fit, best-fit and
//!   worst-fit chunk selection, switchable at runtime.
//! - [`HeapStats`] / [`AllocationCounters`]: fragmentation snapshots and
//!   cumulative event counts.
//! - [`SharedHeap`] / [`HeapBlock`]: one allocator shared by several
//!   owners, with RAII blocks that free themselves on drop.
//!
//! # Memory Layout
//!
//! ```text
//!  offset 0                                                    capacity
//!  ├────────┬──────────┬────────┬──────────────┬────────┬────────────┤
//!  │ header │ payload  │ header │   payload    │ header │  payload   │
//!  │  used  │  (100 B) │  free  │   (200 B)    │  used  │   (50 B)   │
//!  └────────┴──────────┴────────┴──────────────┴────────┴────────────┘
//!           ▲ address returned by allocate()
//! ```
//!
//! Every chunk costs [`HEADER_SIZE`] bytes of bookkeeping, so at all times
//! `bytes_used + bytes_free + HEADER_SIZE * total_blocks == capacity`.
//!
//! # Example
//! ```
//! use heap_sim::{ArenaCapacity, HeapAllocator, HeapError};
//!
//! let mut heap = HeapAllocator::new(ArenaCapacity::from_mb(1)).unwrap();
//!
//! let a = heap.allocate(100).unwrap();
//! let b = heap.allocate(200).unwrap();
//! let c = heap.allocate(50).unwrap();
//!
//! heap.free(b).unwrap();
//! assert!(heap.stats().free_blocks >= 2);
//!
//! heap.free(a).unwrap();
//! heap.free(c).unwrap();
//! assert_eq!(heap.stats().free_blocks, 1);
//!
//! assert_eq!(heap.free(c), Err(HeapError::DoubleFree { address: c }));
//! ```

mod capacity;
mod chunk;
mod error;
mod heap;
pub mod placement;
mod shared;
mod stats;

pub use capacity::ArenaCapacity;
pub use chunk::{ChunkInfo, ChunkRecord, HEADER_SIZE};
pub use error::HeapError;
pub use heap::HeapAllocator;
pub use placement::{BestFit, FirstFit, PlacementPolicy, PlacementStrategy, WorstFit};
pub use shared::{HeapBlock, SharedHeap};
pub use stats::{AllocationCounters, HeapStats};
