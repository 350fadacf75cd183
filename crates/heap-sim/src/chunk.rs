// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Chunk records: the entries of the free list.
//!
//! A chunk is a header followed by its payload. Headers are not stored in
//! the arena bytes; each [`ChunkRecord`] remembers the arena offset where
//! its header would live, so every address computation is plain integer
//! arithmetic.

/// Bookkeeping overhead charged per chunk, in bytes.
///
/// Models a size word, a status word and a link word on a 64-bit machine.
pub const HEADER_SIZE: usize = 24;

/// One entry of the address-ordered free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRecord {
    /// Arena offset of this chunk's header.
    pub offset: usize,
    /// Payload size in bytes (header excluded).
    pub size_bytes: usize,
    /// Whether the payload is available for allocation.
    pub is_free: bool,
    /// Bytes the live allocation asked for. Zero while free.
    pub requested_bytes: usize,
}

impl ChunkRecord {
    pub(crate) fn free(offset: usize, size_bytes: usize) -> Self {
        Self {
            offset,
            size_bytes,
            is_free: true,
            requested_bytes: 0,
        }
    }

    /// Address handed to callers: the first byte after the header.
    pub fn payload_address(&self) -> usize {
        self.offset + HEADER_SIZE
    }

    /// One past the last byte of this chunk (header + payload).
    pub fn end(&self) -> usize {
        self.offset + HEADER_SIZE + self.size_bytes
    }

    /// Whether `address` falls anywhere inside this chunk's extent.
    pub fn contains(&self, address: usize) -> bool {
        (self.offset..self.end()).contains(&address)
    }

    /// Bytes inside a used chunk that were not asked for.
    pub fn wasted_bytes(&self) -> usize {
        if self.is_free {
            0
        } else {
            self.size_bytes - self.requested_bytes
        }
    }
}

/// A read-only view of a chunk, for layout dumps and visualisation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChunkInfo {
    /// Position in the free list.
    pub index: usize,
    pub offset: usize,
    pub payload_address: usize,
    pub size_bytes: usize,
    pub is_free: bool,
    pub requested_bytes: usize,
}

impl ChunkInfo {
    pub(crate) fn from_record(index: usize, record: &ChunkRecord) -> Self {
        Self {
            index,
            offset: record.offset,
            payload_address: record.payload_address(),
            size_bytes: record.size_bytes,
            is_free: record.is_free,
            requested_bytes: record.requested_bytes,
        }
    }
}
