// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI errors and their process exit codes.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 1 | configuration missing or invalid |
//! | 2 | bad arguments |
//! | 3 | no one is signed in |
//! | 4 | the backend rejected the request |
//! | 5 | the backend could not be reached |
//! | 6 | session storage or terminal I/O failed |
//! | 7 | anything else |

use thiserror::Error;

use portal_config::ConfigError;
use portal_core::{AuthError, StorageError};

/// Result alias for CLI commands.
pub type BinResult<T> = Result<T, BinError>;

/// Exit code for configuration problems.
pub const EXIT_CONFIG: i32 = 1;
/// Exit code for bad arguments.
pub const EXIT_USAGE: i32 = 2;
/// Exit code when a command needs a session and there is none.
pub const EXIT_SIGNED_OUT: i32 = 3;
/// Exit code for a rejected request.
pub const EXIT_REJECTED: i32 = 4;
/// Exit code for an unreachable backend.
pub const EXIT_UNREACHABLE: i32 = 5;
/// Exit code for storage and terminal failures.
pub const EXIT_IO: i32 = 6;
/// Fallback exit code.
pub const EXIT_OTHER: i32 = 7;

/// Everything a `portal` command can fail with.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Arguments do not make sense together.
    #[error("{0}")]
    Usage(String),

    /// Reading the terminal or a file failed.
    #[error("i/o failure: {0}")]
    Io(String),

    /// Unexpected failure.
    #[error("{0}")]
    Runtime(String),

    /// Sign-in, validation or refresh failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Session storage failed.
    #[error("session storage: {0}")]
    Storage(#[from] StorageError),

    /// Loading the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error with a description of what was being attempted.
    #[error("{context}")]
    WithContext {
        /// What was being attempted.
        context: String,
        /// Why it failed.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Invalid configuration.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Bad arguments.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Unexpected failure.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// The command needs a signed-in user.
    pub fn not_signed_in() -> Self {
        Self::Auth(AuthError::NotAuthenticated)
    }

    /// Wraps the error with what was being attempted.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::Config(_) => EXIT_CONFIG,
            Self::Usage(_) => EXIT_USAGE,
            Self::Auth(AuthError::NotAuthenticated) => EXIT_SIGNED_OUT,
            Self::Auth(AuthError::Transport { .. }) => EXIT_UNREACHABLE,
            Self::Auth(AuthError::StorageUnavailable { .. }) => EXIT_IO,
            Self::Auth(_) => EXIT_REJECTED,
            Self::Storage(_) | Self::Io(_) => EXIT_IO,
            Self::Runtime(_) => EXIT_OTHER,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// Hint for the user, if the error has one.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Auth(AuthError::NotAuthenticated) => {
                Some("Sign in first with `portal login -u <username>`.".to_string())
            }
            Self::Auth(auth) => Some(auth.user_message()),
            Self::Config(ConfigError::FileNotFound { .. }) => {
                Some("Pass --config or set PORTAL_CONFIG.".to_string())
            }
            Self::WithContext { source, .. } => source.hint(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{err:#}"))
    }
}

// =============================================================================
// Reporting
// =============================================================================

/// Prints the error, its causes and a hint to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("portal: {error}");

    let mut cause = std::error::Error::source(error);
    while let Some(err) = cause {
        eprintln!("  because: {err}");
        cause = err.source();
    }

    if let Some(hint) = error.hint() {
        eprintln!("hint: {hint}");
    }
}

/// Reports the error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_exit_code() {
        let err = BinError::config("storage.path is empty").with_context("Loading portal.yaml");
        assert_eq!(err.to_string(), "Loading portal.yaml");
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("invalid configuration: storage.path is empty".to_string())
        );
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn test_exit_codes_by_failure() {
        assert_eq!(BinError::usage("--password and --password-stdin").exit_code(), EXIT_USAGE);
        assert_eq!(BinError::not_signed_in().exit_code(), EXIT_SIGNED_OUT);
        assert_eq!(BinError::from(AuthError::rejected(401, "bad")).exit_code(), EXIT_REJECTED);
        assert_eq!(BinError::from(AuthError::transport("refused")).exit_code(), EXIT_UNREACHABLE);
        assert_eq!(BinError::from(StorageError::unavailable("read-only")).exit_code(), EXIT_IO);
        assert_eq!(BinError::runtime("boom").exit_code(), EXIT_OTHER);
    }

    #[test]
    fn test_hints() {
        assert!(BinError::not_signed_in().hint().unwrap().contains("portal login"));
        assert_eq!(
            BinError::from(AuthError::rejected(401, "Invalid username or password")).hint(),
            Some("Invalid username or password".to_string())
        );
        assert!(BinError::usage("x").hint().is_none());
    }
}
