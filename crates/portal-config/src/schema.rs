// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema.
//!
//! ```yaml
//! api:
//!   base_url: https://clinic.example/api
//!   timeout: 10s
//! storage:
//!   backend: file
//!   path: .portal/session.json
//! routes:
//!   rules:
//!     - pattern: /manager/reports/*
//!       access: protected
//!       base_role: manager
//!       permissions: [VIEW_REPORT]
//! logging:
//!   level: info
//!   format: text
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use portal_auth::AuthClientConfig;
use portal_core::{RouteGuard, RouteRule, RouteTable, LOGIN_PATH, UNAUTHORIZED_PATH};
use portal_store::{StorageBackendKind, StorageConfig};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// PortalConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Authentication backend client.
    #[serde(default)]
    pub api: AuthClientConfig,

    /// Session persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Route table.
    #[serde(default)]
    pub routes: RoutesConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PortalConfig {
    /// Validates every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.validate_api()?;
        self.validate_storage()?;
        self.routes.validate()?;
        Ok(())
    }

    fn validate_api(&self) -> ConfigResult<()> {
        let url = url::Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::validation("api.base_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::validation(
                "api.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.api.timeout.is_zero() {
            return Err(ConfigError::validation("api.timeout", "must be greater than zero"));
        }

        let paths = [
            ("api.login_path", &self.api.login_path),
            ("api.logout_path", &self.api.logout_path),
            ("api.me_path", &self.api.me_path),
            ("api.refresh_path", &self.api.refresh_path),
        ];
        for (field, path) in paths {
            if path.trim().is_empty() {
                return Err(ConfigError::validation(field, "must not be empty"));
            }
        }
        Ok(())
    }

    fn validate_storage(&self) -> ConfigResult<()> {
        let keys = &self.storage.keys;
        if keys.token.trim().is_empty() {
            return Err(ConfigError::validation("storage.keys.token", "must not be empty"));
        }
        if keys.user.trim().is_empty() {
            return Err(ConfigError::validation("storage.keys.user", "must not be empty"));
        }
        if keys.token == keys.user {
            return Err(ConfigError::validation(
                "storage.keys",
                "token and user keys must differ",
            ));
        }
        if self.storage.backend == StorageBackendKind::File
            && self.storage.path.as_os_str().is_empty()
        {
            return Err(ConfigError::validation(
                "storage.path",
                "required for the file backend",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// RoutesConfig
// =============================================================================

/// Route table configuration.
///
/// Rules are merged over the built-in portal table; a rule with an existing
/// pattern replaces it. With `replace_defaults` only the listed rules apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Drop the built-in table.
    #[serde(default)]
    pub replace_defaults: bool,

    /// Sign-in page.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Access-denied page.
    #[serde(default = "default_unauthorized_path")]
    pub unauthorized_path: String,

    /// Additional or replacing rules.
    #[serde(default)]
    pub rules: Vec<RouteRule>,
}

fn default_login_path() -> String {
    LOGIN_PATH.to_string()
}

fn default_unauthorized_path() -> String {
    UNAUTHORIZED_PATH.to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            replace_defaults: false,
            login_path: default_login_path(),
            unauthorized_path: default_unauthorized_path(),
            rules: Vec::new(),
        }
    }
}

impl RoutesConfig {
    /// Validates page paths and rule patterns.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::validation("routes.login_path", "must start with '/'"));
        }
        if !self.unauthorized_path.starts_with('/') {
            return Err(ConfigError::validation(
                "routes.unauthorized_path",
                "must start with '/'",
            ));
        }

        let mut seen = HashSet::new();
        for (i, rule) in self.rules.iter().enumerate() {
            let field = format!("routes.rules[{i}].pattern");
            if !RouteRule::is_valid_pattern(&rule.pattern) {
                return Err(ConfigError::validation(
                    field,
                    format!(
                        "'{}' must start with '/' and may only end with '*'",
                        rule.pattern
                    ),
                ));
            }
            if !seen.insert(rule.pattern.as_str()) {
                return Err(ConfigError::validation(
                    field,
                    format!("duplicate pattern '{}'", rule.pattern),
                ));
            }
        }
        Ok(())
    }

    /// Builds the effective route table.
    pub fn route_table(&self) -> RouteTable {
        let mut table = if self.replace_defaults {
            RouteTable::new()
        } else {
            RouteTable::default_portal()
        };
        for rule in &self.rules {
            table.add(rule.clone());
        }
        table
    }

    /// Builds the guard for the configured pages.
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new()
            .with_login_path(&self.login_path)
            .with_unauthorized_path(&self.unauthorized_path)
    }
}

// =============================================================================
// LoggingConfig
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    Info,
    /// Warning level.
    #[default]
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines.
    Json,
    /// Compact single-line text.
    Compact,
}

impl LogFormat {
    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }

    /// Parses a format name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{GuardRequirement, RouteAccess};

    #[test]
    fn test_default_config_is_valid() {
        assert!(PortalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = PortalConfig::default();
        config.api.base_url = "clinic.example".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api.base_url"));

        config.api.base_url = "ftp://clinic.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_keys_must_differ() {
        let mut config = PortalConfig::default();
        config.storage.keys.user = "token".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_route_pattern() {
        let mut config = PortalConfig::default();
        config.routes.rules.push(RouteRule::public("help"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_route_pattern() {
        let mut config = PortalConfig::default();
        config.routes.rules.push(RouteRule::public("/help"));
        config.routes.rules.push(RouteRule::public_only("/help"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_route_table_merges_over_defaults() {
        let routes = RoutesConfig {
            rules: vec![RouteRule::public("/admin/*")],
            ..Default::default()
        };
        let table = routes.route_table();

        assert_eq!(table.len(), RouteTable::default_portal().len());
        assert_eq!(table.match_path("/admin").unwrap().access, RouteAccess::Public);
    }

    #[test]
    fn test_route_table_replace_defaults() {
        let routes = RoutesConfig {
            replace_defaults: true,
            rules: vec![RouteRule::protected("/reports/*", GuardRequirement::new())],
            ..Default::default()
        };
        assert_eq!(routes.route_table().len(), 1);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Text));
    }
}
