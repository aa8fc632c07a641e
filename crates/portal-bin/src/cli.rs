// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use portal_config::{LogFormat, LogLevel, DEFAULT_CONFIG_FILE};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Clinic portal session shell.
///
/// Signs staff and patients in against the clinic backend, keeps the session
/// on disk, and checks which portal pages the current user may open.
#[derive(Parser, Debug)]
#[command(
    name = "portal",
    author = "Sylvex <contact@sylvex.io>",
    version = portal_core::VERSION,
    about = "Clinic portal session and route guard shell",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_FILE,
        env = "PORTAL_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Log format (text, json, compact)
    #[arg(long, global = true, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in and store the session
    ///
    /// Prints the landing page for the user's base role.
    Login(LoginArgs),

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in user
    ///
    /// This is the default command when no subcommand is specified.
    Whoami(WhoamiArgs),

    /// Check whether a portal path may be opened
    ///
    /// Prints `render`, `wait` or the redirect target.
    Open(OpenArgs),

    /// List the route table with the current user's access
    Routes(RoutesArgs),

    /// Print the landing page for the current session
    Home(HomeArgs),

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Validate the configuration file
    Validate(ValidateArgs),

    /// Print crate versions and the configuration in use
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `login` command.
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long)]
    pub username: String,

    /// Password
    #[arg(short, long, env = "PORTAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long, conflicts_with = "password")]
    pub password_stdin: bool,

    /// Page to continue to after signing in
    #[arg(long)]
    pub return_to: Option<String>,
}

/// Arguments for the `whoami` command.
#[derive(Args, Debug, Default, Clone)]
pub struct WhoamiArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Skip confirming the session with the backend
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `open` command.
#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Portal path, optionally with a query string
    pub path: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Skip confirming the session with the backend
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `routes` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RoutesArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Skip confirming the session with the backend
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `home` command.
#[derive(Args, Debug, Default, Clone)]
pub struct HomeArgs {
    /// Skip confirming the session with the backend
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::parse(s).ok_or_else(|| format!("unknown log level '{s}'"))
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::parse(s).ok_or_else(|| format!("unknown log format '{s}'"))
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `whoami`.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Whoami(WhoamiArgs::default()))
    }

    /// Get the effective log level, given the configured one.
    pub fn effective_log_level(&self, configured: LogLevel) -> LogLevel {
        if self.quiet {
            LogLevel::Error
        } else if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level.unwrap_or(configured)
        }
    }

    /// Get the effective log format, given the configured one.
    pub fn effective_log_format(&self, configured: LogFormat) -> LogFormat {
        self.log_format.unwrap_or(configured)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["portal"]);
        assert!(matches!(cli.effective_command(), Commands::Whoami(_)));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["portal", "-c", "/etc/portal.toml", "-l", "debug", "routes"]);
        assert_eq!(cli.config, PathBuf::from("/etc/portal.toml"));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.effective_log_level(LogLevel::Warn), LogLevel::Debug);
    }

    #[test]
    fn test_quiet_overrides_level() {
        let cli = Cli::parse_from(["portal", "-q", "-l", "trace", "home"]);
        assert_eq!(cli.effective_log_level(LogLevel::Info), LogLevel::Error);

        let cli = Cli::parse_from(["portal", "home"]);
        assert_eq!(cli.effective_log_level(LogLevel::Info), LogLevel::Info);
        assert_eq!(cli.effective_log_format(LogFormat::Json), LogFormat::Json);
    }

    #[test]
    fn test_login_command() {
        let cli = Cli::parse_from(["portal", "login", "-u", "dr.kim", "--password-stdin"]);
        if let Some(Commands::Login(args)) = cli.command {
            assert_eq!(args.username, "dr.kim");
            assert!(args.password_stdin);
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_login_password_conflict() {
        let result = Cli::try_parse_from([
            "portal",
            "login",
            "-u",
            "dr.kim",
            "-p",
            "secret",
            "--password-stdin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_open_command() {
        let cli = Cli::parse_from(["portal", "open", "/admin/employees", "--offline", "-f", "json"]);
        if let Some(Commands::Open(args)) = cli.command {
            assert_eq!(args.path, "/admin/employees");
            assert!(args.offline);
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Open command");
        }
    }

    #[test]
    fn test_invalid_log_format() {
        assert!(Cli::try_parse_from(["portal", "--log-format", "xml", "home"]).is_err());
    }
}
