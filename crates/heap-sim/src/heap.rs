// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Free-list heap allocator over a fixed-size arena.
//!
//! The [`HeapAllocator`] owns:
//!
//! 1. An arena of `capacity` bytes (`Vec<u8>`), holding payload data.
//! 2. An address-ordered list of [`ChunkRecord`]s that tiles the arena
//!    exactly: each chunk is `HEADER_SIZE` bytes of bookkeeping followed by
//!    its payload, and the next chunk starts where the previous one ends.
//! 3. The active [`PlacementPolicy`] and cumulative [`AllocationCounters`].
//!
//! Addresses are arena offsets. An address returned by
//! [`allocate`](HeapAllocator::allocate) points at the first payload byte,
//! `HEADER_SIZE` bytes past its chunk's start.
//!
//! # Thread Safety
//! None. The allocator is a single-threaded simulation; wrap it in a lock
//! if several threads must share one.

use std::collections::BTreeSet;

use crate::{
    AllocationCounters, ArenaCapacity, ChunkInfo, ChunkRecord, HeapError, HeapStats,
    PlacementPolicy, HEADER_SIZE,
};

/// The simulated heap.
///
/// # Example
/// ```
/// use heap_sim::{ArenaCapacity, HeapAllocator, PlacementPolicy};
///
/// let mut heap = HeapAllocator::new(ArenaCapacity::from_kb(4)).unwrap();
/// let a = heap.allocate(256).unwrap();
/// heap.free(a).unwrap();
///
/// // First-fit hands the same block back.
/// assert_eq!(heap.allocate(256).unwrap(), a);
///
/// heap.set_policy(PlacementPolicy::BestFit);
/// assert_eq!(heap.policy(), PlacementPolicy::BestFit);
/// ```
pub struct HeapAllocator {
    capacity: usize,
    arena: Vec<u8>,
    /// Sorted by `offset`, no gaps, no overlaps.
    chunks: Vec<ChunkRecord>,
    policy: PlacementPolicy,
    counters: AllocationCounters,
    /// Payload addresses of chunks absorbed by coalescing, until an
    /// allocation covers them again.
    absorbed: BTreeSet<usize>,
}

impl HeapAllocator {
    /// Creates an allocator whose arena is one free chunk.
    ///
    /// Fails with [`HeapError::ArenaTooSmall`] if the arena cannot hold a
    /// header and at least one payload byte.
    pub fn new(capacity: ArenaCapacity) -> Result<Self, HeapError> {
        Self::with_policy(capacity, PlacementPolicy::default())
    }

    /// Creates an allocator with an explicit starting policy.
    pub fn with_policy(capacity: ArenaCapacity, policy: PlacementPolicy) -> Result<Self, HeapError> {
        let capacity = capacity.as_bytes();
        let minimum = HEADER_SIZE + 1;
        if capacity < minimum {
            return Err(HeapError::ArenaTooSmall {
                capacity_bytes: capacity,
                minimum_bytes: minimum,
            });
        }

        tracing::debug!("heap created: {capacity} bytes, policy {policy}");

        Ok(Self {
            capacity,
            arena: vec![0u8; capacity],
            chunks: vec![ChunkRecord::free(0, capacity - HEADER_SIZE)],
            policy,
            counters: AllocationCounters::default(),
            absorbed: BTreeSet::new(),
        })
    }

    /// Allocates `size` bytes and returns the payload address.
    ///
    /// The chunk chosen by the active policy is split when the leftover can
    /// hold another header plus at least one byte; otherwise the whole chunk
    /// is handed out and the leftover counts as internal waste until freed.
    /// The payload is zeroed.
    pub fn allocate(&mut self, size: usize) -> Result<usize, HeapError> {
        if size == 0 {
            tracing::warn!("rejected zero-byte allocation");
            self.counters.record_zero_size();
            return Err(HeapError::ZeroSizeRequest);
        }

        let Some(index) = self.policy.strategy().select(&self.chunks, size) else {
            let largest_free_bytes = self.largest_free_block();
            tracing::warn!(
                "allocation of {size} bytes failed under {} (largest free block {largest_free_bytes})",
                self.policy,
            );
            self.counters.record_oom();
            return Err(HeapError::OutOfMemory {
                requested_bytes: size,
                largest_free_bytes,
            });
        };

        let split = self.split_chunk(index, size);
        let chunk = &mut self.chunks[index];
        chunk.is_free = false;
        chunk.requested_bytes = size;
        let start = chunk.offset;
        let address = chunk.payload_address();
        let end = chunk.end();
        self.arena[address..end].fill(0);

        let covered: Vec<usize> = self.absorbed.range(start..end).copied().collect();
        for a in covered {
            self.absorbed.remove(&a);
        }

        self.counters.record_allocation(split);
        let used = self.bytes_used();
        self.counters.update_peak(used);

        tracing::debug!(
            "allocated {size} bytes at {address:#x} (chunk {index}, {}, split: {split})",
            self.policy,
        );
        Ok(address)
    }

    /// Releases the allocation at `address` and coalesces free neighbours.
    pub fn free(&mut self, address: usize) -> Result<(), HeapError> {
        let index = match self.locate_for_free(address) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("{e}");
                match e {
                    HeapError::DoubleFree { .. } => self.counters.record_double_free(),
                    _ => self.counters.record_invalid_free(),
                }
                return Err(e);
            }
        };

        let chunk = &mut self.chunks[index];
        chunk.is_free = true;
        chunk.requested_bytes = 0;

        let merges = self.merge_free_chunks();
        self.counters.record_free(merges);
        tracing::debug!("released {address:#x} ({merges} merges)");
        Ok(())
    }

    /// Switches the placement policy; applies to the next allocation.
    pub fn set_policy(&mut self, policy: PlacementPolicy) {
        if policy != self.policy {
            tracing::info!("placement policy: {} -> {policy}", self.policy);
        }
        self.policy = policy;
    }

    /// Returns the active placement policy.
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    /// Returns the arena size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Computes a snapshot of the free list.
    pub fn stats(&self) -> HeapStats {
        HeapStats::collect(self.capacity, &self.chunks)
    }

    /// Returns the cumulative event counters.
    pub fn counters(&self) -> &AllocationCounters {
        &self.counters
    }

    /// Returns the free list in address order.
    pub fn chunks(&self) -> &[ChunkRecord] {
        &self.chunks
    }

    /// Returns a serialisable view of every chunk, in address order.
    pub fn layout(&self) -> Vec<ChunkInfo> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(i, c)| ChunkInfo::from_record(i, c))
            .collect()
    }

    /// Returns the size of the largest free chunk, 0 if none.
    pub fn largest_free_block(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.is_free)
            .map(|c| c.size_bytes)
            .max()
            .unwrap_or(0)
    }

    /// Whether `address` is the payload address of a live allocation.
    pub fn is_allocated(&self, address: usize) -> bool {
        self.find_payload(address)
            .is_some_and(|i| !self.chunks[i].is_free)
    }

    /// Returns the requested size of the live allocation at `address`.
    pub fn allocation_size(&self, address: usize) -> Result<usize, HeapError> {
        let index = self.live_index(address)?;
        Ok(self.chunks[index].requested_bytes)
    }

    /// Reads `len` payload bytes of the allocation at `address`.
    pub fn read(&self, address: usize, len: usize) -> Result<&[u8], HeapError> {
        let index = self.live_index(address)?;
        self.check_bounds(index, 0, len)?;
        Ok(&self.arena[address..address + len])
    }

    /// Writes `bytes` into the allocation at `address`, starting `offset`
    /// bytes into its payload.
    pub fn write(&mut self, address: usize, offset: usize, bytes: &[u8]) -> Result<(), HeapError> {
        let index = self.live_index(address)?;
        self.check_bounds(index, offset, bytes.len())?;
        let start = address + offset;
        self.arena[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Bytes in used chunks, internal waste included.
    fn bytes_used(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| !c.is_free)
            .map(|c| c.size_bytes)
            .sum()
    }

    /// Carves `needed` bytes off the front of chunk `index`, inserting the
    /// remainder as a new free chunk right after it. Returns whether a split
    /// happened.
    fn split_chunk(&mut self, index: usize, needed: usize) -> bool {
        let chunk = self.chunks[index];
        let leftover = chunk.size_bytes - needed;

        // The remainder must hold a header plus at least one byte.
        if leftover <= HEADER_SIZE {
            return false;
        }

        let remainder = ChunkRecord::free(chunk.payload_address() + needed, leftover - HEADER_SIZE);
        self.chunks[index].size_bytes = needed;
        self.chunks.insert(index + 1, remainder);
        true
    }

    /// Fuses runs of address-adjacent free chunks in one forward pass and
    /// returns the number of pairwise fusions.
    ///
    /// After a fusion the same position is tested again against its new
    /// successor, so a run of any length collapses in a single pass. This
    /// relies on `chunks` being sorted by address.
    pub(crate) fn merge_free_chunks(&mut self) -> u64 {
        let mut merges = 0;
        let mut i = 0;
        while i + 1 < self.chunks.len() {
            let curr = self.chunks[i];
            let next = self.chunks[i + 1];

            if curr.is_free && next.is_free && curr.end() == next.offset {
                self.chunks[i].size_bytes += HEADER_SIZE + next.size_bytes;
                self.chunks.remove(i + 1);
                self.absorbed.insert(next.payload_address());
                merges += 1;
            } else {
                i += 1;
            }
        }
        merges
    }

    /// Index of the chunk whose payload starts at `address`.
    fn find_payload(&self, address: usize) -> Option<usize> {
        self.chunks
            .binary_search_by_key(&address, ChunkRecord::payload_address)
            .ok()
    }

    /// Index of the chunk whose extent contains `address`.
    fn find_containing(&self, address: usize) -> Option<usize> {
        let after = self.chunks.partition_point(|c| c.offset <= address);
        let index = after.checked_sub(1)?;
        self.chunks[index].contains(address).then_some(index)
    }

    fn live_index(&self, address: usize) -> Result<usize, HeapError> {
        self.find_payload(address)
            .filter(|&i| !self.chunks[i].is_free)
            .ok_or(HeapError::InvalidAddress { address })
    }

    fn check_bounds(&self, index: usize, offset: usize, len: usize) -> Result<(), HeapError> {
        let chunk = &self.chunks[index];
        let in_bounds = offset
            .checked_add(len)
            .is_some_and(|end| end <= chunk.requested_bytes);
        if in_bounds {
            Ok(())
        } else {
            Err(HeapError::AccessOutOfBounds {
                address: chunk.payload_address(),
                offset,
                len,
                size_bytes: chunk.requested_bytes,
            })
        }
    }

    /// Classifies `address` for `free` without mutating anything.
    ///
    /// A double free is either a free chunk's own payload address or the
    /// payload address of a block that was released and then absorbed into
    /// a neighbour by coalescing. Any other address is an invalid free.
    fn locate_for_free(&self, address: usize) -> Result<usize, HeapError> {
        if address < HEADER_SIZE || address >= self.capacity {
            return Err(HeapError::InvalidFree { address });
        }

        if let Some(index) = self.find_payload(address) {
            return if self.chunks[index].is_free {
                Err(HeapError::DoubleFree { address })
            } else {
                Ok(index)
            };
        }

        let absorbed = self.absorbed.contains(&address)
            && self
                .find_containing(address)
                .is_some_and(|i| self.chunks[i].is_free);
        if absorbed {
            Err(HeapError::DoubleFree { address })
        } else {
            Err(HeapError::InvalidFree { address })
        }
    }
}

impl std::fmt::Debug for HeapAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapAllocator")
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("chunks", &self.chunks.len())
            .field("largest_free_block", &self.largest_free_block())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap(bytes: usize) -> HeapAllocator {
        HeapAllocator::new(ArenaCapacity::from_bytes(bytes)).unwrap()
    }

    fn assert_tiles(h: &HeapAllocator) {
        let mut expected = 0;
        for c in h.chunks() {
            assert_eq!(c.offset, expected, "gap or overlap at chunk {c:?}");
            expected = c.end();
        }
        assert_eq!(expected, h.capacity());

        let s = h.stats();
        assert_eq!(s.bytes_used + s.bytes_free + s.header_bytes, s.capacity);
    }

    #[test]
    fn test_new_single_free_chunk() {
        let h = heap(1024);
        assert_eq!(h.chunks().len(), 1);
        assert_eq!(h.chunks()[0].size_bytes, 1024 - HEADER_SIZE);
        assert!(h.chunks()[0].is_free);
        assert_tiles(&h);
    }

    #[test]
    fn test_arena_too_small() {
        let r = HeapAllocator::new(ArenaCapacity::from_bytes(HEADER_SIZE));
        assert!(matches!(r, Err(HeapError::ArenaTooSmall { .. })));
        assert!(HeapAllocator::new(ArenaCapacity::from_bytes(HEADER_SIZE + 1)).is_ok());
    }

    #[test]
    fn test_allocate_returns_payload_address() {
        let mut h = heap(1024);
        let a = h.allocate(100).unwrap();
        assert_eq!(a, HEADER_SIZE);
        let b = h.allocate(50).unwrap();
        assert_eq!(b, a + 100 + HEADER_SIZE);
        assert_tiles(&h);
    }

    #[test]
    fn test_zero_size_request() {
        let mut h = heap(1024);
        assert_eq!(h.allocate(0), Err(HeapError::ZeroSizeRequest));
        assert_eq!(h.chunks().len(), 1);
        assert_eq!(h.counters().zero_size_requests, 1);
    }

    #[test]
    fn test_out_of_memory_boundary() {
        let mut h = heap(1024);
        let largest = h.stats().max_free_block_size;
        assert!(matches!(
            h.allocate(largest + 1),
            Err(HeapError::OutOfMemory { requested_bytes, largest_free_bytes })
                if requested_bytes == largest + 1 && largest_free_bytes == largest
        ));
        assert!(h.allocate(largest).is_ok());
        assert!(matches!(h.allocate(1), Err(HeapError::OutOfMemory { .. })));
        assert_eq!(h.counters().oom_count, 2);
    }

    #[test]
    fn test_split_only_when_remainder_fits_header() {
        let mut h = heap(1024);
        let total = h.chunks()[0].size_bytes;

        // Leftover exactly HEADER_SIZE: no split, whole chunk handed out.
        let a = h.allocate(total - HEADER_SIZE).unwrap();
        assert_eq!(h.chunks().len(), 1);
        assert_eq!(h.chunks()[0].size_bytes, total);
        assert_eq!(h.stats().internal_waste_bytes, HEADER_SIZE);
        h.free(a).unwrap();

        // Leftover HEADER_SIZE + 1: split with a one-byte remainder.
        h.allocate(total - HEADER_SIZE - 1).unwrap();
        assert_eq!(h.chunks().len(), 2);
        assert_eq!(h.chunks()[1].size_bytes, 1);
        assert_tiles(&h);
    }

    #[test]
    fn test_reuse_same_address_first_fit() {
        let mut h = heap(1024 * 1024);
        let p = h.allocate(256).unwrap();
        h.free(p).unwrap();
        assert_eq!(h.allocate(256).unwrap(), p);
    }

    #[test]
    fn test_double_free_leaves_state_unchanged() {
        let mut h = heap(4096);
        let _a = h.allocate(64).unwrap();
        let b = h.allocate(64).unwrap();
        let _c = h.allocate(64).unwrap();
        h.free(b).unwrap();

        let before = h.chunks().to_vec();
        assert_eq!(h.free(b), Err(HeapError::DoubleFree { address: b }));
        assert_eq!(h.chunks(), &before[..]);
        assert_eq!(h.counters().double_frees, 1);
    }

    #[test]
    fn test_double_free_after_coalescing() {
        let mut h = heap(4096);
        let a = h.allocate(64).unwrap();
        let b = h.allocate(64).unwrap();
        h.free(a).unwrap();
        // b merges backwards into a's chunk, so b is no longer a chunk start.
        h.free(b).unwrap();
        assert_eq!(h.chunks().len(), 1);
        assert_eq!(h.free(b), Err(HeapError::DoubleFree { address: b }));
    }

    #[test]
    fn test_invalid_free() {
        let mut h = heap(4096);
        let a = h.allocate(64).unwrap();

        assert_eq!(h.free(0), Err(HeapError::InvalidFree { address: 0 }));
        assert_eq!(h.free(4096), Err(HeapError::InvalidFree { address: 4096 }));
        assert_eq!(h.free(0x123456), Err(HeapError::InvalidFree { address: 0x123456 }));
        // Inside a live allocation but not its start.
        assert_eq!(h.free(a + 8), Err(HeapError::InvalidFree { address: a + 8 }));
        assert!(h.is_allocated(a));
        assert_eq!(h.counters().invalid_frees, 4);
    }

    #[test]
    fn test_free_inside_free_space_is_invalid() {
        let mut h = heap(4096);
        let addr = HEADER_SIZE + 5;
        assert_eq!(h.free(addr), Err(HeapError::InvalidFree { address: addr }));

        let a = h.allocate(64).unwrap();
        let _b = h.allocate(64).unwrap();
        h.free(a).unwrap();
        assert_eq!(h.free(a + 8), Err(HeapError::InvalidFree { address: a + 8 }));
        assert_eq!(h.free(a), Err(HeapError::DoubleFree { address: a }));
        assert_eq!(h.counters().invalid_frees, 2);
        assert_eq!(h.counters().double_frees, 1);
    }

    #[test]
    fn test_reallocated_absorbed_address_is_not_a_double_free() {
        let mut h = heap(4096);
        let a = h.allocate(64).unwrap();
        let b = h.allocate(64).unwrap();
        let _guard = h.allocate(64).unwrap();
        h.free(a).unwrap();
        h.free(b).unwrap();
        assert_eq!(h.free(b), Err(HeapError::DoubleFree { address: b }));

        // One large block now spans b's old payload address.
        let big = h.allocate(128).unwrap();
        assert_eq!(big, a);
        assert_eq!(h.free(b), Err(HeapError::InvalidFree { address: b }));

        // A split puts a chunk start back at b; freeing c absorbs it again.
        h.free(big).unwrap();
        let c = h.allocate(64).unwrap();
        assert_eq!(c, a);
        h.free(c).unwrap();
        assert_eq!(h.chunks()[0].size_bytes, 152);
        assert_eq!(h.free(c), Err(HeapError::DoubleFree { address: c }));
        assert_eq!(h.free(b), Err(HeapError::DoubleFree { address: b }));
    }

    #[test]
    fn test_fragmentation_then_full_coalescing() {
        let mut h = heap(1024 * 1024);
        let a = h.allocate(100).unwrap();
        let b = h.allocate(200).unwrap();
        let c = h.allocate(50).unwrap();

        h.free(b).unwrap();
        let s = h.stats();
        assert!(s.free_blocks >= 2);
        assert!(s.fragmentation > 0.0);

        h.free(a).unwrap();
        h.free(c).unwrap();
        let s = h.stats();
        assert_eq!(s.free_blocks, 1);
        assert_eq!(s.total_blocks, 1);
        assert_eq!(s.fragmentation, 0.0);
        assert_tiles(&h);
    }

    #[test]
    fn test_merge_collapses_long_run_in_one_pass() {
        let mut h = heap(4096);
        let ptrs: Vec<usize> = (0..5).map(|_| h.allocate(32).unwrap()).collect();

        // Flip four neighbours to free without merging, then merge once.
        for &p in &ptrs[..4] {
            let i = h.find_payload(p).unwrap();
            h.chunks[i].is_free = true;
            h.chunks[i].requested_bytes = 0;
        }
        let last = h.find_payload(ptrs[4]).unwrap();
        h.chunks[last].is_free = false;
        assert_eq!(h.chunks().len(), 6);

        let merges = h.merge_free_chunks();
        assert_eq!(merges, 3);
        assert_eq!(h.chunks().len(), 3);
        assert!(h.chunks()[0].is_free);
        assert_eq!(h.chunks()[0].size_bytes, 4 * 32 + 3 * HEADER_SIZE);
        assert_tiles(&h);
    }

    #[test]
    fn test_best_fit_fills_tightest_hole() {
        let mut h = heap(8192);
        let a = h.allocate(400).unwrap();
        let _g1 = h.allocate(16).unwrap();
        let b = h.allocate(120).unwrap();
        let _g2 = h.allocate(16).unwrap();
        h.free(a).unwrap();
        h.free(b).unwrap();

        h.set_policy(PlacementPolicy::BestFit);
        assert_eq!(h.allocate(100).unwrap(), b);
    }

    #[test]
    fn test_worst_fit_uses_largest_block() {
        let mut h = heap(8192);
        let a = h.allocate(400).unwrap();
        let _guard = h.allocate(16).unwrap();
        h.free(a).unwrap();

        h.set_policy(PlacementPolicy::WorstFit);
        let p = h.allocate(100).unwrap();
        // The tail chunk is larger than the 400-byte hole.
        assert!(p > a + 400);
    }

    #[test]
    fn test_payload_zeroed_and_writable() {
        let mut h = heap(1024);
        let a = h.allocate(16).unwrap();
        h.write(a, 0, &[0xFF; 16]).unwrap();
        assert_eq!(h.read(a, 16).unwrap(), &[0xFF; 16]);
        h.free(a).unwrap();

        let b = h.allocate(16).unwrap();
        assert_eq!(b, a);
        assert!(h.read(b, 16).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_access_bounds() {
        let mut h = heap(1024);
        let a = h.allocate(8).unwrap();
        assert!(h.write(a, 4, &[1, 2, 3, 4]).is_ok());
        assert!(matches!(
            h.write(a, 5, &[1, 2, 3, 4]),
            Err(HeapError::AccessOutOfBounds { .. })
        ));
        assert!(matches!(h.read(a + 1, 1), Err(HeapError::InvalidAddress { .. })));
        assert_eq!(h.allocation_size(a).unwrap(), 8);
    }

    #[test]
    fn test_peak_and_counters() {
        let mut h = heap(4096);
        let a = h.allocate(1000).unwrap();
        let b = h.allocate(500).unwrap();
        h.free(a).unwrap();
        h.free(b).unwrap();
        let c = h.counters();
        assert_eq!(c.allocations, 2);
        assert_eq!(c.frees, 2);
        assert_eq!(c.peak_bytes_used, 1500);
        assert_eq!(c.splits, 2);
        assert_eq!(c.merges, 2);
    }

    #[test]
    fn test_layout_view() {
        let mut h = heap(1024);
        let a = h.allocate(100).unwrap();
        let layout = h.layout();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].payload_address, a);
        assert!(!layout[0].is_free);
        assert_eq!(layout[1].index, 1);
        assert!(layout[1].is_free);
    }

    #[test]
    fn test_debug_format() {
        let h = heap(1024);
        let debug = format!("{h:?}");
        assert!(debug.contains("HeapAllocator"));
        assert!(debug.contains("first-fit") || debug.contains("FirstFit"));
    }
}
