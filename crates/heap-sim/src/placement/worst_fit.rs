// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Worst-fit placement: the largest free chunk, provided it fits.

use crate::placement::{candidates, PlacementStrategy};
use crate::ChunkRecord;

/// Takes the largest fitting chunk, so the remainder stays usable.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstFit;

impl PlacementStrategy for WorstFit {
    fn name(&self) -> &'static str {
        "worst-fit"
    }

    fn select(&self, chunks: &[ChunkRecord], size: usize) -> Option<usize> {
        let mut worst: Option<(usize, usize)> = None;
        for (i, c) in candidates(chunks, size) {
            if worst.map_or(true, |(_, s)| c.size_bytes > s) {
                worst = Some((i, c.size_bytes));
            }
        }
        worst.map(|(i, _)| i)
    }
}
