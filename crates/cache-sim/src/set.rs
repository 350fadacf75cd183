// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cache lines and LRU-ordered sets.

use std::collections::VecDeque;

/// One cache line: a valid bit and a tag.
///
/// Lines start invalid and become valid on their first fill. After that
/// they are only ever refilled with a new tag on eviction; there is no
/// explicit invalidation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: usize,
}

/// A set of `ways` lines ordered from most- to least-recently used.
///
/// The number of lines never changes: a hit rotates a line to the front, a
/// miss drops the back line and pushes the new one at the front.
#[derive(Debug, Clone)]
pub struct CacheSet {
    lines: VecDeque<CacheLine>,
}

impl CacheSet {
    /// Creates a set of `ways` invalid lines.
    pub fn new(ways: usize) -> Self {
        Self {
            lines: std::iter::repeat(CacheLine::default()).take(ways).collect(),
        }
    }

    /// Looks up `tag`, updating recency. Returns `true` on a hit.
    ///
    /// On a miss the LRU line is evicted and `tag` is filled in at the MRU
    /// position.
    pub fn access(&mut self, tag: usize) -> bool {
        if let Some(pos) = self.lines.iter().position(|l| l.valid && l.tag == tag) {
            if let Some(line) = self.lines.remove(pos) {
                self.lines.push_front(line);
            }
            return true;
        }

        self.lines.pop_back();
        self.lines.push_front(CacheLine { valid: true, tag });
        false
    }

    /// Whether `tag` is resident, without touching recency.
    pub fn contains(&self, tag: usize) -> bool {
        self.lines.iter().any(|l| l.valid && l.tag == tag)
    }

    /// Lines from MRU to LRU.
    pub fn lines(&self) -> impl Iterator<Item = &CacheLine> {
        self.lines.iter()
    }

    /// Number of lines (the associativity).
    pub fn ways(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(set: &CacheSet) -> Vec<Option<usize>> {
        set.lines().map(|l| l.valid.then_some(l.tag)).collect()
    }

    #[test]
    fn test_new_set_is_invalid() {
        let set = CacheSet::new(4);
        assert_eq!(set.ways(), 4);
        assert!(set.lines().all(|l| !l.valid));
    }

    #[test]
    fn test_fill_order_is_mru_first() {
        let mut set = CacheSet::new(3);
        assert!(!set.access(1));
        assert!(!set.access(2));
        assert_eq!(tags(&set), vec![Some(2), Some(1), None]);
    }

    #[test]
    fn test_hit_promotes_to_mru() {
        let mut set = CacheSet::new(3);
        set.access(1);
        set.access(2);
        set.access(3);
        assert!(set.access(1));
        assert_eq!(tags(&set), vec![Some(1), Some(3), Some(2)]);
    }

    #[test]
    fn test_miss_evicts_lru() {
        let mut set = CacheSet::new(2);
        set.access(10);
        set.access(20);
        set.access(30);
        assert!(!set.contains(10));
        assert_eq!(tags(&set), vec![Some(30), Some(20)]);
        assert_eq!(set.ways(), 2);
    }

    #[test]
    fn test_invalid_line_never_matches() {
        // Tag 0 equals the default tag of invalid lines.
        let mut set = CacheSet::new(2);
        assert!(!set.access(0));
        assert!(set.access(0));
    }
}
