// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-config
//!
//! Configuration for the clinic portal shell.
//!
//! ## Sections
//!
//! - `api` - authentication backend client
//! - `storage` - where the session is persisted
//! - `routes` - route table overrides and page paths
//! - `logging` - log level and format
//!
//! ## Quick Start
//!
//! ```no_run
//! use portal_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load("portal.yaml").unwrap();
//! println!("Backend: {}", config.api.base_url);
//! ```
//!
//! YAML, TOML and JSON files are accepted. Values may reference environment
//! variables as `${VAR}` or `${VAR:default}`, and `PORTAL_*` variables
//! override individual settings after parsing.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use schema::{LogFormat, LogLevel, LoggingConfig, PortalConfig, RoutesConfig};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
