// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memsim config` command: print the effective configuration.
//!
//! The output is valid TOML and can be saved and passed back via `--config`.

use simulator::SimConfig;

pub fn execute(config: SimConfig) -> anyhow::Result<()> {
    // Fail early on values that would only be rejected at session build time.
    config.build_heap()?;
    config.build_cache()?;

    print!("{}", config.to_toml()?);
    Ok(())
}
