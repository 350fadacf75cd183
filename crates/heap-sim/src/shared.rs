// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared allocator context and RAII block handles.
//!
//! Several data structures often want to carve their storage out of the
//! *same* heap. Instead of a global allocator, a [`SharedHeap`] handle is
//! constructed once and cloned into each structure that needs it; every
//! clone refers to the same [`HeapAllocator`].
//!
//! Blocks obtained through the handle are [`HeapBlock`] guards. Dropping a
//! guard frees its block, so a structure that owns guards returns its
//! memory automatically when it goes away.
//!
//! ```text
//! SharedHeap::allocate(size)
//!       │
//!       ▼
//!   HeapBlock  ◄─── address + Rc<RefCell<HeapAllocator>>
//!       │
//!       │  drop()
//!       ▼
//!   HeapAllocator::free(address)  ──► coalescing
//! ```
//!
//! The handle is `Rc`-based and therefore `!Send`: the simulation is
//! single-threaded.

use crate::{ArenaCapacity, HeapAllocator, HeapError, HeapStats, PlacementPolicy};
use std::cell::RefCell;
use std::rc::Rc;

/// A cloneable handle to one shared [`HeapAllocator`].
///
/// # Example
/// ```
/// use heap_sim::{ArenaCapacity, SharedHeap};
///
/// let heap = SharedHeap::new(ArenaCapacity::from_kb(64)).unwrap();
/// let other = heap.clone();
///
/// let block = heap.allocate(128).unwrap();
/// assert_eq!(other.stats().used_blocks, 1);
///
/// drop(block);
/// assert_eq!(other.stats().used_blocks, 0);
/// ```
#[derive(Clone)]
pub struct SharedHeap {
    inner: Rc<RefCell<HeapAllocator>>,
}

impl SharedHeap {
    /// Creates a new heap and wraps it in a shared handle.
    pub fn new(capacity: ArenaCapacity) -> Result<Self, HeapError> {
        Ok(Self::from_allocator(HeapAllocator::new(capacity)?))
    }

    /// Wraps an existing allocator.
    pub fn from_allocator(heap: HeapAllocator) -> Self {
        Self {
            inner: Rc::new(RefCell::new(heap)),
        }
    }

    /// Allocates `size` bytes and returns a guard that frees them on drop.
    pub fn allocate(&self, size: usize) -> Result<HeapBlock, HeapError> {
        let address = self.inner.borrow_mut().allocate(size)?;
        Ok(HeapBlock {
            address: Some(address),
            size_bytes: size,
            heap: Rc::clone(&self.inner),
        })
    }

    /// Frees a raw address previously released with [`HeapBlock::into_address`].
    pub fn free(&self, address: usize) -> Result<(), HeapError> {
        self.inner.borrow_mut().free(address)
    }

    /// Switches the shared heap's placement policy.
    pub fn set_policy(&self, policy: PlacementPolicy) {
        self.inner.borrow_mut().set_policy(policy);
    }

    /// Returns a snapshot of the shared heap's statistics.
    pub fn stats(&self) -> HeapStats {
        self.inner.borrow().stats()
    }

    /// Whether two handles refer to the same heap.
    pub fn same_heap(&self, other: &SharedHeap) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Runs `f` with shared access to the underlying allocator.
    pub fn with<R>(&self, f: impl FnOnce(&HeapAllocator) -> R) -> R {
        f(&self.inner.borrow())
    }
}

impl std::fmt::Debug for SharedHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedHeap")
            .field("heap", &*self.inner.borrow())
            .field("handles", &Rc::strong_count(&self.inner))
            .finish()
    }
}

/// An RAII guard for one live allocation in a [`SharedHeap`].
///
/// # Example
/// ```ignore
/// let block = heap.allocate(64)?;
/// block.write(0, b"hello")?;
/// drop(block);            // freed and coalesced
/// ```
pub struct HeapBlock {
    /// `None` once ownership has been released with `into_address`.
    address: Option<usize>,
    size_bytes: usize,
    heap: Rc<RefCell<HeapAllocator>>,
}

impl HeapBlock {
    /// Payload address of this block.
    pub fn address(&self) -> usize {
        self.address.unwrap_or_default()
    }

    /// Requested size of this block in bytes.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Copies the block's payload out of the arena.
    pub fn read(&self) -> Result<Vec<u8>, HeapError> {
        let heap = self.heap.borrow();
        let bytes = heap.read(self.address(), self.size_bytes)?.to_vec();
        Ok(bytes)
    }

    /// Writes `bytes` at `offset` within the block.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> Result<(), HeapError> {
        self.heap.borrow_mut().write(self.address(), offset, bytes)
    }

    /// Gives up ownership without freeing; the caller becomes responsible
    /// for calling [`SharedHeap::free`].
    pub fn into_address(mut self) -> usize {
        self.address.take().unwrap_or_default()
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        let Some(address) = self.address.take() else {
            return;
        };
        // Dropped while the heap is borrowed: leak the block rather than panic.
        let Ok(mut heap) = self.heap.try_borrow_mut() else {
            tracing::warn!("heap busy, block at {address:#x} leaked on drop");
            return;
        };
        if let Err(e) = heap.free(address) {
            tracing::warn!("failed to release block on drop: {e}");
        }
    }
}

impl std::fmt::Debug for HeapBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapBlock")
            .field("address", &self.address)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SharedHeap {
        SharedHeap::new(ArenaCapacity::from_kb(16)).unwrap()
    }

    #[test]
    fn test_clones_share_one_heap() {
        let a = shared();
        let b = a.clone();
        assert!(a.same_heap(&b));
        assert!(!a.same_heap(&shared()));

        let _block = b.allocate(100).unwrap();
        assert_eq!(a.stats().used_blocks, 1);
    }

    #[test]
    fn test_drop_frees_and_coalesces() {
        let heap = shared();
        let x = heap.allocate(100).unwrap();
        let y = heap.allocate(200).unwrap();
        assert_eq!(heap.stats().total_blocks, 3);

        drop(x);
        drop(y);
        let s = heap.stats();
        assert_eq!(s.total_blocks, 1);
        assert_eq!(s.used_blocks, 0);
    }

    #[test]
    fn test_read_write() {
        let heap = shared();
        let block = heap.allocate(8).unwrap();
        block.write(2, &[7, 8]).unwrap();
        assert_eq!(block.read().unwrap(), vec![0, 0, 7, 8, 0, 0, 0, 0]);
        assert!(block.write(7, &[1, 2]).is_err());
    }

    #[test]
    fn test_drop_while_heap_borrowed_does_not_panic() {
        let heap = shared();
        let block = heap.allocate(32).unwrap();
        let addr = block.address();

        heap.with(move |h| {
            assert!(h.is_allocated(addr));
            drop(block);
        });

        // The block could not be returned, so it is still live.
        assert_eq!(heap.stats().used_blocks, 1);
        heap.free(addr).unwrap();
        assert_eq!(heap.stats().used_blocks, 0);
    }

    #[test]
    fn test_into_address_releases_ownership() {
        let heap = shared();
        let block = heap.allocate(32).unwrap();
        let addr = block.into_address();
        assert_eq!(heap.stats().used_blocks, 1);

        heap.free(addr).unwrap();
        assert_eq!(heap.stats().used_blocks, 0);
        assert!(matches!(heap.free(addr), Err(HeapError::DoubleFree { .. })));
    }

    #[test]
    fn test_allocation_errors_propagate() {
        let heap = shared();
        assert!(matches!(heap.allocate(0), Err(HeapError::ZeroSizeRequest)));
        assert!(matches!(
            heap.allocate(1024 * 1024),
            Err(HeapError::OutOfMemory { .. })
        ));
    }

    #[test]
    fn test_policy_applies_to_all_handles() {
        let heap = shared();
        let other = heap.clone();
        other.set_policy(PlacementPolicy::WorstFit);
        assert_eq!(heap.with(|h| h.policy()), PlacementPolicy::WorstFit);
    }

    #[test]
    fn test_vec_of_blocks_released_together() {
        let heap = shared();
        let blocks: Vec<HeapBlock> = (1..=10).map(|i| heap.allocate(i * 16).unwrap()).collect();
        assert_eq!(heap.stats().used_blocks, 10);
        drop(blocks);
        assert_eq!(heap.stats().total_blocks, 1);
    }
}
