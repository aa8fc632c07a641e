// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `portal version`

use crate::cli::Cli;
use crate::error::BinResult;

fn crate_versions() -> [(&'static str, &'static str); 5] {
    [
        ("portal-bin", crate::VERSION),
        ("portal-core", portal_core::VERSION),
        ("portal-store", portal_store::VERSION),
        ("portal-auth", portal_auth::VERSION),
        ("portal-config", portal_config::VERSION),
    ]
}

/// Prints crate versions and where configuration comes from.
pub fn version(cli: &Cli) -> BinResult<()> {
    println!("portal {}", crate::VERSION);
    println!();
    for (name, version) in crate_versions() {
        println!("  {name:<14} {version}");
    }
    println!();

    let state = if cli.config.exists() { "found" } else { "not found, using defaults" };
    println!("  config         {} ({state})", cli.config.display());
    println!(
        "  platform       {}-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_crates_share_workspace_version() {
        let versions = crate_versions();
        assert!(versions.iter().all(|(_, v)| *v == crate::VERSION));
    }
}
