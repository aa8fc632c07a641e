// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while loading `portal.yaml` and friends.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file on disk is malformed.
    #[error("{path}: {message}")]
    Parse {
        /// The file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// In-memory content is malformed.
    #[error("invalid {format}: {message}")]
    Syntax {
        /// Format the content was read as.
        format: &'static str,
        /// Parser message.
        message: String,
    },

    /// A setting has an unusable value.
    #[error("{field}: {message}")]
    Validation {
        /// Dotted path of the setting, e.g. `routes.rules[2].pattern`.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No file at the given path.
    #[error("no configuration file at {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A `PORTAL_*` override holds an unusable value.
    #[error("environment variable {name}: {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// The extension is not yaml, yml, toml or json.
    #[error("unsupported configuration format '{format}'")]
    UnsupportedFormat {
        /// The extension found.
        format: String,
    },
}

impl ConfigError {
    /// Malformed file.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Malformed content read as `format`.
    pub fn syntax(format: &'static str, message: impl fmt::Display) -> Self {
        Self::Syntax {
            format,
            message: message.to_string(),
        }
    }

    /// Unusable setting.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Unreadable file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Missing file.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Unusable override.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Unknown extension.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Label for the `error_type` log field.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Parse { .. } | Self::Syntax { .. } => "parse",
            Self::Validation { .. } => "validation",
            Self::Io { .. } => "io",
            Self::FileNotFound { .. } => "file_not_found",
            Self::InvalidEnvVar { .. } => "invalid_env_var",
            Self::UnsupportedFormat { .. } => "unsupported_format",
        }
    }
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
