// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-bin
//!
//! Command-line shell for the clinic portal.
//!
//! Every invocation behaves like one browser tab: it hydrates the persisted
//! session, optionally confirms it with the backend, then runs one navigation
//! or auth command.
//!
//! ## Architecture
//!
//! ```text
//!          main.rs
//!             │
//!          cli.rs ──────► logging.rs
//!             │
//!        commands/*
//!             │
//!        runtime.rs
//!             │
//!   ┌─────────┼──────────────┐
//!   ▼         ▼              ▼
//! portal-  portal-auth    portal-core
//! store    (manager,      (guard, routes,
//!          http client)    router)
//! ```
//!
//! ## Usage
//!
//! ```bash
//! portal login -u dr.kim --password-stdin < secret.txt
//! portal open /admin/employees
//! portal whoami --format json
//! portal routes
//! portal logout
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::PortalRuntime;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
