// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena capacity configuration and parsing.
//!
//! An [`ArenaCapacity`] is the fixed size of the simulated heap, chosen at
//! construction time. It accepts human-readable strings so config files and
//! the CLI can say `"1M"` instead of `1048576`.

use crate::HeapError;
use std::fmt;

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;
const GIB: usize = 1024 * 1024 * 1024;

/// The total size of a simulated arena, headers included.
///
/// # Parsing
/// - `"512K"` or `"512KB"` → 512 × 1024 bytes
/// - `"1M"` or `"1MB"` → 1024² bytes
/// - `"1G"` or `"1GB"` → 1024³ bytes
/// - `"4096"` or `"4096B"` → raw byte count
///
/// # Examples
/// ```
/// use heap_sim::ArenaCapacity;
///
/// let c = ArenaCapacity::parse("1M").unwrap();
/// assert_eq!(c.as_bytes(), 1024 * 1024);
/// assert_eq!(c.to_string(), "1 MB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaCapacity {
    bytes: usize,
}

impl ArenaCapacity {
    /// Creates a capacity from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a capacity from kibibytes.
    pub fn from_kb(kb: usize) -> Self {
        Self { bytes: kb * KIB }
    }

    /// Creates a capacity from mebibytes.
    pub fn from_mb(mb: usize) -> Self {
        Self { bytes: mb * MIB }
    }

    /// Returns the capacity in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Parses a human-readable capacity string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, HeapError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HeapError::InvalidCapacity("empty capacity string".into()));
        }

        let upper = s.to_uppercase();
        let (num_str, multiplier) = if let Some(n) = upper.strip_suffix("GB") {
            (n, GIB)
        } else if let Some(n) = upper.strip_suffix('G') {
            (n, GIB)
        } else if let Some(n) = upper.strip_suffix("MB") {
            (n, MIB)
        } else if let Some(n) = upper.strip_suffix('M') {
            (n, MIB)
        } else if let Some(n) = upper.strip_suffix("KB") {
            (n, KIB)
        } else if let Some(n) = upper.strip_suffix('K') {
            (n, KIB)
        } else if let Some(n) = upper.strip_suffix('B') {
            (n, 1)
        } else {
            (upper.as_str(), 1)
        };

        let value: usize = num_str.trim().parse().map_err(|_| {
            HeapError::InvalidCapacity(format!(
                "'{s}': expected a number followed by an optional suffix (K, M, G)"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| HeapError::InvalidCapacity(format!("'{s}' overflows")))?;

        if bytes == 0 {
            return Err(HeapError::InvalidCapacity(format!("'{s}' is zero")));
        }

        Ok(Self { bytes })
    }
}

impl Default for ArenaCapacity {
    /// One mebibyte, the classic teaching-heap size.
    fn default() -> Self {
        Self::from_mb(1)
    }
}

impl std::str::FromStr for ArenaCapacity {
    type Err = HeapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArenaCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= GIB && self.bytes % GIB == 0 {
            write!(f, "{} GB", self.bytes / GIB)
        } else if self.bytes >= MIB && self.bytes % MIB == 0 {
            write!(f, "{} MB", self.bytes / MIB)
        } else if self.bytes >= KIB && self.bytes % KIB == 0 {
            write!(f, "{} KB", self.bytes / KIB)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
