// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the simulation session.

/// Errors that can occur while configuring or driving a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The heap rejected an operation.
    #[error("heap error: {0}")]
    Heap(#[from] heap_sim::HeapError),

    /// A cache level could not be built.
    #[error("cache error: {0}")]
    Cache(#[from] cache_sim::CacheError),

    /// No allocation is bound to this name.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// The name is already bound to a live allocation.
    #[error("variable '{name}' is already bound to {address:#x}")]
    VariableInUse { name: String, address: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
