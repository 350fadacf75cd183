// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for cache construction.
//!
//! Probing never fails; only building a level with an impossible geometry
//! does.

/// Errors that can occur while building a cache level or hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The level's size, line size and associativity do not describe at
    /// least one set.
    #[error("invalid geometry for cache level '{level}': {detail}")]
    InvalidGeometry { level: String, detail: String },
}
