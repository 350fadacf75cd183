// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the simulated heap.

/// Errors reported by the heap allocator.
///
/// Every variant is recoverable: the allocator is left exactly as it was
/// before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    /// `allocate(0)` was requested.
    #[error("cannot allocate zero bytes")]
    ZeroSizeRequest,

    /// No free chunk is large enough for the request under the active policy.
    #[error("out of memory: requested {requested_bytes} bytes, largest free block is {largest_free_bytes} bytes")]
    OutOfMemory {
        requested_bytes: usize,
        largest_free_bytes: usize,
    },

    /// The address is outside the arena or is not the start of a payload.
    #[error("invalid free: address {address:#x} is not a live allocation")]
    InvalidFree { address: usize },

    /// The address refers to memory that is already free.
    #[error("double free detected at address {address:#x}")]
    DoubleFree { address: usize },

    /// A payload read or write referred to something other than a live
    /// allocation.
    #[error("address {address:#x} is not a live allocation")]
    InvalidAddress { address: usize },

    /// A payload read or write ran past the end of the allocation.
    #[error("access of {len} bytes at offset {offset} overruns the {size_bytes}-byte allocation at {address:#x}")]
    AccessOutOfBounds {
        address: usize,
        offset: usize,
        len: usize,
        size_bytes: usize,
    },

    /// The arena cannot hold even one header plus one payload byte.
    #[error("arena of {capacity_bytes} bytes is too small (minimum {minimum_bytes})")]
    ArenaTooSmall {
        capacity_bytes: usize,
        minimum_bytes: usize,
    },

    /// A capacity string could not be parsed.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    /// A placement policy name was not recognised.
    #[error("unknown placement policy '{0}'; expected 'first-fit', 'best-fit', or 'worst-fit'")]
    UnknownPolicy(String),
}
