// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Best-fit placement: the smallest free chunk that still fits.
//!
//! Ties go to the lowest address. Best-fit keeps large blocks available for
//! large requests, at the cost of leaving many small remainders behind.

use crate::placement::{candidates, PlacementStrategy};
use crate::ChunkRecord;

/// Takes the tightest fitting chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFit;

impl PlacementStrategy for BestFit {
    fn name(&self) -> &'static str {
        "best-fit"
    }

    fn select(&self, chunks: &[ChunkRecord], size: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (i, c) in candidates(chunks, size) {
            // Strict comparison keeps the first of equal-sized chunks.
            if best.map_or(true, |(_, s)| c.size_bytes < s) {
                best = Some((i, c.size_bytes));
            }
        }
        best.map(|(i, _)| i)
    }
}
