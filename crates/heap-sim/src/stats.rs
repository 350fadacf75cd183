// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Heap statistics for diagnostics and policy comparison.
//!
//! Two kinds of numbers are kept:
//!
//! - [`HeapStats`] is a point-in-time snapshot computed by walking the free
//!   list: block counts, byte totals and external fragmentation.
//! - [`AllocationCounters`] are cumulative event counts since construction:
//!   how many requests succeeded or failed, how often chunks were split and
//!   merged, and the high-water mark of used bytes.

use crate::{ChunkRecord, HEADER_SIZE};

/// A snapshot of the free list.
///
/// `bytes_used + bytes_free + header_bytes == capacity` always holds.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct HeapStats {
    /// Arena size in bytes, headers included.
    pub capacity: usize,
    pub total_blocks: usize,
    pub free_blocks: usize,
    pub used_blocks: usize,
    /// Payload bytes in free chunks.
    pub bytes_free: usize,
    /// Payload bytes in used chunks, including internal waste.
    pub bytes_used: usize,
    /// Bytes spent on chunk headers.
    pub header_bytes: usize,
    /// The largest request that can currently succeed.
    pub max_free_block_size: usize,
    /// Bytes inside used chunks beyond what was requested.
    pub internal_waste_bytes: usize,
    /// External fragmentation: `1 - max_free_block_size / bytes_free`,
    /// `0.0` when nothing is free.
    pub fragmentation: f64,
}

impl HeapStats {
    /// Walks `chunks` and computes a snapshot.
    pub(crate) fn collect(capacity: usize, chunks: &[ChunkRecord]) -> Self {
        let mut s = HeapStats {
            capacity,
            ..Default::default()
        };

        for c in chunks {
            s.total_blocks += 1;
            if c.is_free {
                s.free_blocks += 1;
                s.bytes_free += c.size_bytes;
                s.max_free_block_size = s.max_free_block_size.max(c.size_bytes);
            } else {
                s.used_blocks += 1;
                s.bytes_used += c.size_bytes;
                s.internal_waste_bytes += c.wasted_bytes();
            }
        }
        s.header_bytes = s.total_blocks * HEADER_SIZE;

        if s.bytes_free > 0 {
            s.fragmentation = 1.0 - s.max_free_block_size as f64 / s.bytes_free as f64;
        }
        s
    }

    /// Fragmentation as a percentage.
    pub fn fragmentation_percent(&self) -> f64 {
        self.fragmentation * 100.0
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "Heap: {} blocks ({} used, {} free), {} B used, {} B free, \
             {} B headers, largest free {} B, {:.2}% fragmentation",
            self.total_blocks,
            self.used_blocks,
            self.free_blocks,
            self.bytes_used,
            self.bytes_free,
            self.header_bytes,
            self.max_free_block_size,
            self.fragmentation_percent(),
        )
    }
}

/// Cumulative allocator event counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationCounters {
    /// Successful allocations.
    pub allocations: u64,
    /// Requests rejected because the size was zero.
    pub zero_size_requests: u64,
    /// Requests rejected because nothing fit.
    pub oom_count: u64,
    /// Successful frees.
    pub frees: u64,
    /// Frees rejected as invalid addresses.
    pub invalid_frees: u64,
    /// Frees rejected as double frees.
    pub double_frees: u64,
    /// Chunks split to carve out an allocation.
    pub splits: u64,
    /// Pairwise fusions performed by coalescing.
    pub merges: u64,
    /// High-water mark of `bytes_used`.
    pub peak_bytes_used: usize,
}

impl AllocationCounters {
    pub(crate) fn record_allocation(&mut self, split: bool) {
        self.allocations += 1;
        if split {
            self.splits += 1;
        }
    }

    pub(crate) fn record_zero_size(&mut self) {
        self.zero_size_requests += 1;
    }

    pub(crate) fn record_oom(&mut self) {
        self.oom_count += 1;
    }

    pub(crate) fn record_free(&mut self, merges: u64) {
        self.frees += 1;
        self.merges += merges;
    }

    pub(crate) fn record_invalid_free(&mut self) {
        self.invalid_frees += 1;
    }

    pub(crate) fn record_double_free(&mut self) {
        self.double_frees += 1;
    }

    pub(crate) fn update_peak(&mut self, bytes_used: usize) {
        if bytes_used > self.peak_bytes_used {
            self.peak_bytes_used = bytes_used;
        }
    }

    /// Total allocation requests, successful or not.
    pub fn total_requests(&self) -> u64 {
        self.allocations + self.zero_size_requests + self.oom_count
    }

    /// Allocation requests that failed for any reason.
    pub fn failed_allocations(&self) -> u64 {
        self.zero_size_requests + self.oom_count
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Allocations: {} ok, {} failed ({} OOM), {} frees ({} rejected), \
             {} splits, {} merges, peak {} B used",
            self.allocations,
            self.failed_allocations(),
            self.oom_count,
            self.frees,
            self.invalid_frees + self.double_frees,
            self.splits,
            self.merges,
            self.peak_bytes_used,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(offset: usize, size_bytes: usize, is_free: bool, requested: usize) -> ChunkRecord {
        ChunkRecord {
            offset,
            size_bytes,
            is_free,
            requested_bytes: requested,
        }
    }

    #[test]
    fn test_default() {
        let s = HeapStats::default();
        assert_eq!(s.total_blocks, 0);
        assert_eq!(s.fragmentation, 0.0);
    }

    #[test]
    fn test_collect() {
        // used 100 (asked 90) | free 200 | used 50 | free 50
        let chunks = vec![
            chunk(0, 100, false, 90),
            chunk(124, 200, true, 0),
            chunk(348, 50, false, 50),
            chunk(422, 50, true, 0),
        ];
        let s = HeapStats::collect(496, &chunks);
        assert_eq!(s.total_blocks, 4);
        assert_eq!(s.used_blocks, 2);
        assert_eq!(s.free_blocks, 2);
        assert_eq!(s.bytes_used, 150);
        assert_eq!(s.bytes_free, 250);
        assert_eq!(s.header_bytes, 4 * HEADER_SIZE);
        assert_eq!(s.max_free_block_size, 200);
        assert_eq!(s.internal_waste_bytes, 10);
        assert!((s.fragmentation - 0.2).abs() < 1e-9);
        assert_eq!(s.bytes_used + s.bytes_free + s.header_bytes, s.capacity);
    }

    #[test]
    fn test_no_free_bytes_means_no_fragmentation() {
        let s = HeapStats::collect(124, &[chunk(0, 100, false, 100)]);
        assert_eq!(s.bytes_free, 0);
        assert_eq!(s.fragmentation, 0.0);
    }

    #[test]
    fn test_counters() {
        let mut c = AllocationCounters::default();
        c.record_allocation(true);
        c.record_allocation(false);
        c.record_zero_size();
        c.record_oom();
        c.record_free(2);
        c.record_double_free();
        assert_eq!(c.total_requests(), 4);
        assert_eq!(c.failed_allocations(), 2);
        assert_eq!(c.splits, 1);
        assert_eq!(c.merges, 2);
    }

    #[test]
    fn test_peak_tracking() {
        let mut c = AllocationCounters::default();
        c.update_peak(100);
        c.update_peak(40);
        assert_eq!(c.peak_bytes_used, 100);
        c.update_peak(300);
        assert_eq!(c.peak_bytes_used, 300);
    }

    #[test]
    fn test_summaries() {
        let s = HeapStats::collect(1024, &[chunk(0, 1000, true, 0)]);
        assert!(s.summary().contains("1 blocks"));
        assert!(s.summary().contains("0.00% fragmentation"));

        let mut c = AllocationCounters::default();
        c.record_allocation(true);
        assert!(c.summary().contains("1 ok"));
    }
}
