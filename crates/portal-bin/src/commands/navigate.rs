// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `open`, `routes` and `home` commands.

use portal_core::{Navigation, RouteAccess, RouteResolution};

use crate::cli::{HomeArgs, OpenArgs, OutputFormat, RoutesArgs};
use crate::commands::session::print_json;
use crate::error::{BinError, BinResult};
use crate::runtime::PortalRuntime;

/// Runs the guard for a path and prints the outcome.
pub async fn open(runtime: &PortalRuntime, args: OpenArgs) -> BinResult<()> {
    if !args.path.starts_with('/') {
        return Err(BinError::usage(format!(
            "path must start with '/': {}",
            args.path
        )));
    }

    runtime.start(args.offline).await;
    let resolution = runtime.open(&args.path);

    match args.format {
        OutputFormat::Text => println!("{}", render_navigation(&resolution)),
        OutputFormat::Json => {
            let value = serde_json::to_value(&resolution)
                .map_err(|e| BinError::runtime(format!("failed to render JSON: {e}")))?;
            print_json(&value)?;
        }
    }
    Ok(())
}

/// Lists the route table with the current user's access.
pub async fn routes(runtime: &PortalRuntime, args: RoutesArgs) -> BinResult<()> {
    runtime.start(args.offline).await;

    let mut rules: Vec<_> = runtime.routes().rules().iter().collect();
    rules.sort_by(|a, b| a.pattern.cmp(&b.pattern));

    match args.format {
        OutputFormat::Text => {
            let width = rules.iter().map(|r| r.pattern.len()).max().unwrap_or(0);
            for rule in rules {
                let mark = if runtime.can_access(rule) { "✓" } else { "✗" };
                println!(
                    "{mark} {:width$}  {}",
                    rule.pattern,
                    describe_access(&rule.access)
                );
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = rules
                .into_iter()
                .map(|rule| {
                    serde_json::json!({
                        "pattern": rule.pattern,
                        "access": rule.access.kind(),
                        "requirement": describe_access(&rule.access),
                        "allowed": runtime.can_access(rule),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(entries))?;
        }
    }
    Ok(())
}

/// Prints the landing page for the current session.
pub async fn home(runtime: &PortalRuntime, args: HomeArgs) -> BinResult<()> {
    let ctx = runtime.start(args.offline).await;
    if !ctx.is_authenticated() {
        return Err(BinError::not_signed_in());
    }
    println!("{}", ctx.home_path());
    Ok(())
}

// =============================================================================
// Formatting
// =============================================================================

fn render_navigation(resolution: &RouteResolution) -> String {
    match &resolution.navigation {
        Navigation::Render => format!("render {}", resolution.path),
        Navigation::Wait => format!("wait {}", resolution.path),
        Navigation::Redirect(redirect) => format!("redirect {}", redirect.location()),
    }
}

fn describe_access(access: &RouteAccess) -> String {
    match access {
        RouteAccess::Protected(requirement) => requirement.to_string(),
        other => other.kind().to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
