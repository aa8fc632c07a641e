// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `login` / `logout` / `refresh`: session lifecycle
//! - `whoami` / `home`: current user
//! - `open` / `routes`: route guard
//! - `validate` / `version`: housekeeping

mod navigate;
mod session;
mod validate;
mod version;

pub use navigate::{home, open, routes};
pub use session::{login, logout, refresh, whoami};
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::{load_config, PortalRuntime};
use portal_config::PortalConfig;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    let config = load_config(&cli);

    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_logging(
        cli.effective_log_level(logging.level),
        cli.effective_log_format(logging.format),
    );

    match cli.effective_command() {
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::Login(args) => session::login(&runtime(config)?, args).await,
        Commands::Logout => session::logout(&runtime(config)?).await,
        Commands::Whoami(args) => session::whoami(&runtime(config)?, args).await,
        Commands::Refresh => session::refresh(&runtime(config)?).await,
        Commands::Open(args) => navigate::open(&runtime(config)?, args).await,
        Commands::Routes(args) => navigate::routes(&runtime(config)?, args).await,
        Commands::Home(args) => navigate::home(&runtime(config)?, args).await,
    }
}

fn runtime(config: BinResult<PortalConfig>) -> BinResult<PortalRuntime> {
    PortalRuntime::new(config?)
}
