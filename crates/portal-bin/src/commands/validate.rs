// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use portal_config::{ConfigError, ConfigLoader, PortalConfig};
use portal_store::StorageBackendKind;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::commands::session::print_json;
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(ConfigError::file_not_found(config_path).into());
    }

    let config = ConfigLoader::new().load(config_path).map_err(|e| {
        BinError::from(e).with_context(format!("{} is not valid", config_path.display()))
    })?;

    let warnings = collect_warnings(&config);
    let routes = config.routes.route_table();

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  API:       {}", config.api.base_url);
            println!("  Timeout:   {:?}", config.api.timeout);
            println!("  Storage:   {}", config.storage.backend.as_str());
            if config.storage.backend == StorageBackendKind::File {
                println!("  Path:      {}", config.storage.path.display());
            }
            println!("  Routes:    {}", routes.len());
            println!("  Log level: {}", config.logging.level);

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                let rendered = serde_json::to_string_pretty(&config)
                    .unwrap_or_else(|_| "(serialization error)".to_string());
                println!("{rendered}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "api_base_url": config.api.base_url,
                    "storage_backend": config.storage.backend.as_str(),
                    "storage_path": config.storage.path.display().to_string(),
                    "route_count": routes.len(),
                    "log_level": config.logging.level.as_str(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            print_json(&output)?;
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "{} warning(s) with --strict",
            warnings.len()
        )));
    }

    Ok(())
}

fn collect_warnings(config: &PortalConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Ok(url) = url::Url::parse(&config.api.base_url) {
        let local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
        if url.scheme() == "http" && !local {
            warnings.push(format!(
                "API is reached over plain HTTP: {}",
                config.api.base_url
            ));
        }
    }

    match config.storage.backend {
        StorageBackendKind::Detached => {
            warnings.push("Storage is detached: sessions are not kept between commands".to_string())
        }
        StorageBackendKind::Memory => {
            warnings.push("Storage is in memory: sessions end with each command".to_string())
        }
        StorageBackendKind::File => {}
    }

    if config.routes.replace_defaults && config.routes.rules.is_empty() {
        warnings.push(
            "Default routes replaced with an empty table: every page only requires sign-in"
                .to_string(),
        );
    }

    warnings
}

// =============================================================================
// Tests
// =============================================================================
