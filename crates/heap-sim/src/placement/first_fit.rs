// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! First-fit placement: the first free chunk large enough, in address order.

use crate::placement::{candidates, PlacementStrategy};
use crate::ChunkRecord;

/// Takes the lowest-addressed chunk that fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl PlacementStrategy for FirstFit {
    fn name(&self) -> &'static str {
        "first-fit"
    }

    fn select(&self, chunks: &[ChunkRecord], size: usize) -> Option<usize> {
        candidates(chunks, size).next().map(|(i, _)| i)
    }
}
