// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Placement strategies and the runtime-switchable [`PlacementPolicy`].
//!
//! | Policy | Picks | Tends to |
//! |---|---|---|
//! | [`FirstFit`] | first fitting chunk in address order | fast, fragments the low end |
//! | [`BestFit`] | smallest fitting chunk | keeps large blocks intact, leaves slivers |
//! | [`WorstFit`] | largest fitting chunk | leaves usable remainders, breaks up large blocks |

pub mod best_fit;
pub mod first_fit;
pub mod worst_fit;

pub use best_fit::BestFit;
pub use first_fit::FirstFit;
pub use worst_fit::WorstFit;

use crate::{ChunkRecord, HeapError};
use std::fmt;

/// Trait for placement strategies.
///
/// A strategy only chooses; committing the choice (splitting, marking used)
/// is the allocator's job. Strategies are pure functions of the free list,
/// so they are trivially unit-testable.
pub trait PlacementStrategy {
    /// Human-readable name of this strategy.
    fn name(&self) -> &'static str;

    /// Returns the index of the chunk that should satisfy a request of
    /// `size` bytes, or `None` if no free chunk is large enough.
    fn select(&self, chunks: &[ChunkRecord], size: usize) -> Option<usize>;
}

/// Iterates `(index, chunk)` over free chunks that can hold `size` bytes.
pub(crate) fn candidates(
    chunks: &[ChunkRecord],
    size: usize,
) -> impl Iterator<Item = (usize, &ChunkRecord)> {
    chunks
        .iter()
        .enumerate()
        .filter(move |(_, c)| c.is_free && c.size_bytes >= size)
}

static FIRST_FIT: FirstFit = FirstFit;
static BEST_FIT: BestFit = BestFit;
static WORST_FIT: WorstFit = WorstFit;

/// The placement policy an allocator is currently using.
///
/// Switchable at any time; the change applies to the next allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    #[default]
    FirstFit,
    BestFit,
    WorstFit,
}

impl PlacementPolicy {
    /// All policies, in a stable order.
    pub const ALL: [PlacementPolicy; 3] = [
        PlacementPolicy::FirstFit,
        PlacementPolicy::BestFit,
        PlacementPolicy::WorstFit,
    ];

    /// Returns the strategy implementing this policy.
    pub fn strategy(self) -> &'static dyn PlacementStrategy {
        match self {
            PlacementPolicy::FirstFit => &FIRST_FIT,
            PlacementPolicy::BestFit => &BEST_FIT,
            PlacementPolicy::WorstFit => &WORST_FIT,
        }
    }

    /// Kebab-case name, e.g. `"best-fit"`.
    pub fn name(self) -> &'static str {
        self.strategy().name()
    }

    /// Parses `first`, `first-fit`, `first_fit` and friends. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, HeapError> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "first" | "first-fit" | "firstfit" => Ok(PlacementPolicy::FirstFit),
            "best" | "best-fit" | "bestfit" => Ok(PlacementPolicy::BestFit),
            "worst" | "worst-fit" | "worstfit" => Ok(PlacementPolicy::WorstFit),
            _ => Err(HeapError::UnknownPolicy(s.trim().to_string())),
        }
    }
}

impl std::str::FromStr for PlacementPolicy {
    type Err = HeapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::layout;
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(PlacementPolicy::parse("first").unwrap(), PlacementPolicy::FirstFit);
        assert_eq!(PlacementPolicy::parse("Best-Fit").unwrap(), PlacementPolicy::BestFit);
        assert_eq!(PlacementPolicy::parse("worst_fit").unwrap(), PlacementPolicy::WorstFit);
        assert_eq!("best".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::BestFit);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            PlacementPolicy::parse("next-fit"),
            Err(HeapError::UnknownPolicy(name)) if name == "next-fit"
        ));
    }

    #[test]
    fn test_names_and_display() {
        assert_eq!(PlacementPolicy::FirstFit.to_string(), "first-fit");
        assert_eq!(PlacementPolicy::BestFit.name(), "best-fit");
        assert_eq!(PlacementPolicy::WorstFit.strategy().name(), "worst-fit");
        assert_eq!(PlacementPolicy::default(), PlacementPolicy::FirstFit);
    }

    #[test]
    fn test_serde_kebab_case() {
        let json = serde_json::to_string(&PlacementPolicy::WorstFit).unwrap();
        assert_eq!(json, "\"worst-fit\"");
        let back: PlacementPolicy = serde_json::from_str("\"best-fit\"").unwrap();
        assert_eq!(back, PlacementPolicy::BestFit);
    }

    #[test]
    fn test_policies_disagree_on_mixed_layout() {
        // Free chunks of 300, 100, 500 separated by used chunks.
        let chunks = layout(&[
            (300, true),
            (10, false),
            (100, true),
            (10, false),
            (500, true),
        ]);
        let pick = |p: PlacementPolicy| p.strategy().select(&chunks, 80);
        assert_eq!(pick(PlacementPolicy::FirstFit), Some(0));
        assert_eq!(pick(PlacementPolicy::BestFit), Some(2));
        assert_eq!(pick(PlacementPolicy::WorstFit), Some(4));
    }

    #[test]
    fn test_no_candidate() {
        let chunks = layout(&[(64, true), (1000, false)]);
        for p in PlacementPolicy::ALL {
            assert_eq!(p.strategy().select(&chunks, 65), None, "{p}");
        }
    }
}
