// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file (a missing file is an error for [`ConfigLoader::load`],
//!    defaults for [`ConfigLoader::load_or_default`])
//! 2. Substitute `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse YAML, TOML or JSON by extension
//! 4. Apply `PORTAL_*` overrides
//! 5. Resolve a relative storage path against the file's directory
//! 6. Validate
//!
//! # Environment Overrides
//!
//! ```text
//! PORTAL_API_BASE_URL=https://clinic.example/api
//! PORTAL_API_TIMEOUT=15s
//! PORTAL_STORAGE_BACKEND=memory
//! PORTAL_STORAGE_PATH=/var/lib/portal/session.json
//! PORTAL_LOG_LEVEL=debug
//! PORTAL_LOG_FORMAT=json
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use portal_store::StorageBackendKind;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, PortalConfig};

/// Prefix of override variables.
pub const ENV_PREFIX: &str = "PORTAL";

/// Configuration file looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "portal.yaml";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads [`PortalConfig`] from files or strings.
#[derive(Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
    resolve_paths: bool,
    env: EnvLookup,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("env_prefix", &self.env_prefix)
            .field("resolve_env_vars", &self.resolve_env_vars)
            .field("resolve_paths", &self.resolve_paths)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader reading the process environment.
    pub fn new() -> Self {
        Self {
            env_prefix: ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replaces the environment with a fixed set of variables.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.env = Arc::new(move |name| vars.get(name).cloned());
        self
    }

    /// Sets the override variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholders and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads configuration from a file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<PortalConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let format = ConfigFormat::from_path(path)?;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::file_not_found(path));
            }
            Err(e) => return Err(ConfigError::io(path, e)),
        };

        let mut config = self.parse(&content, format).map_err(|e| match e {
            ConfigError::Syntax { message, .. } => ConfigError::parse(path, message),
            other => other,
        })?;

        if let Err(e) = self.finish(&mut config, path.parent()) {
            warn!(
                path = %path.display(),
                error_type = e.error_type(),
                error = %e,
                "Configuration rejected"
            );
            return Err(e);
        }
        debug!(
            backend = %config.storage.backend,
            rules = config.routes.rules.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise starts from defaults.
    ///
    /// Overrides and validation apply either way.
    pub fn load_or_default(&self, path: impl AsRef<Path>) -> ConfigResult<PortalConfig> {
        let path = path.as_ref();
        if path.exists() {
            return self.load(path);
        }

        debug!(path = %path.display(), "No configuration file, using defaults");
        let mut config = PortalConfig::default();
        self.finish(&mut config, None)?;
        Ok(config)
    }

    /// Loads configuration from a string.
    ///
    /// Relative paths are left as they are.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<PortalConfig> {
        let mut config = self.parse(content, format)?;
        self.finish(&mut config, None)?;
        Ok(config)
    }

    fn parse(&self, content: &str, format: ConfigFormat) -> ConfigResult<PortalConfig> {
        let content = if self.resolve_env_vars {
            self.substitute_placeholders(content)
        } else {
            content.to_string()
        };
        parse_str(&content, format)
    }

    fn finish(&self, config: &mut PortalConfig, base_dir: Option<&Path>) -> ConfigResult<()> {
        if self.resolve_env_vars {
            self.apply_env_overrides(config)?;
        }
        if self.resolve_paths {
            if let Some(base_dir) = base_dir {
                resolve_relative_paths(config, base_dir);
            }
        }
        config.validate()
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    /// Replaces `${VAR}` and `${VAR:default}`.
    ///
    /// An unset variable without a default is left in place.
    fn substitute_placeholders(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let expr = &after[..end];
            let (name, default) = match expr.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (expr, None),
            };

            match (self.var(name), default) {
                (Some(value), _) => out.push_str(&value),
                (None, Some(default)) => out.push_str(default),
                (None, None) => {
                    warn!(variable = name, "Environment variable not set");
                    out.push_str(&rest[start..start + 2 + end + 1]);
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }

    fn apply_env_overrides(&self, config: &mut PortalConfig) -> ConfigResult<()> {
        let name = |suffix: &str| format!("{}_{}", self.env_prefix, suffix);

        if let Some(value) = self.var(&name("API_BASE_URL")) {
            config.api.base_url = value;
        }
        if let Some(value) = self.var(&name("API_TIMEOUT")) {
            config.api.timeout = humantime_serde::re::humantime::parse_duration(value.trim())
                .map_err(|e| ConfigError::invalid_env_var(name("API_TIMEOUT"), e.to_string()))?;
        }
        if let Some(value) = self.var(&name("STORAGE_BACKEND")) {
            config.storage.backend = StorageBackendKind::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(
                    name("STORAGE_BACKEND"),
                    "expected one of: memory, file, detached",
                )
            })?;
        }
        if let Some(value) = self.var(&name("STORAGE_PATH")) {
            config.storage.path = PathBuf::from(value);
        }
        if let Some(value) = self.var(&name("LOG_LEVEL")) {
            config.logging.level = LogLevel::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(
                    name("LOG_LEVEL"),
                    "expected one of: trace, debug, info, warn, error",
                )
            })?;
        }
        if let Some(value) = self.var(&name("LOG_FORMAT")) {
            config.logging.format = LogFormat::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(name("LOG_FORMAT"), "expected one of: text, json, compact")
            })?;
        }
        Ok(())
    }
}

fn resolve_relative_paths(config: &mut PortalConfig, base_dir: &Path) {
    if config.storage.path.is_relative() && !base_dir.as_os_str().is_empty() {
        config.storage.path = base_dir.join(&config.storage.path);
    }
}

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => {
            let source = config::Config::builder()
                .add_source(config::File::from_str(content, config::FileFormat::Yaml))
                .build()
                .map_err(|e| ConfigError::syntax("yaml", e))?;
            source
                .try_deserialize()
                .map_err(|e| ConfigError::syntax("yaml", e))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::syntax("toml", e))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::syntax("json", e))
        }
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn isolated() -> ConfigLoader {
        ConfigLoader::new().with_env(Vec::<(String, String)>::new())
    }

    const YAML: &str = r#"
api:
  base_url: https://clinic.example/api
  timeout: 5s
storage:
  backend: file
  path: state/session.json
routes:
  rules:
    - pattern: /manager/reports/*
      access: protected
      base_role: manager
      permissions: [VIEW_REPORT]
logging:
  level: debug
"#;

    #[test]
    fn test_load_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portal.yaml");
        fs::write(&path, YAML).unwrap();

        let config = isolated().load(&path).unwrap();

        assert_eq!(config.api.base_url, "https://clinic.example/api");
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.storage.path, dir.path().join("state/session.json"));
        assert_eq!(config.routes.rules.len(), 1);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_load_toml_and_json() {
        let toml = r#"
[api]
base_url = "http://localhost:9000"

[storage]
backend = "memory"
"#;
        let config = isolated().load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.storage.backend, StorageBackendKind::Memory);

        let json = r#"{"api": {"base_url": "http://localhost:9000", "timeout": "1m"}}"#;
        let config = isolated().load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.api.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_placeholders() {
        let loader = isolated().with_env([("CLINIC_API", "https://api.clinic.example")]);
        let content = r#"{"api": {"base_url": "${CLINIC_API}", "user_agent": "${AGENT:portal-cli}"}}"#;

        let config = loader.load_from_str(content, ConfigFormat::Json).unwrap();

        assert_eq!(config.api.base_url, "https://api.clinic.example");
        assert_eq!(config.api.user_agent, "portal-cli");
    }

    #[test]
    fn test_unset_placeholder_kept() {
        let loader = isolated();
        assert_eq!(loader.substitute_placeholders("a ${MISSING} b"), "a ${MISSING} b");
        assert_eq!(loader.substitute_placeholders("unterminated ${X"), "unterminated ${X");
    }

    #[test]
    fn test_env_overrides() {
        let loader = isolated().with_env([
            ("PORTAL_API_BASE_URL", "https://override.example"),
            ("PORTAL_API_TIMEOUT", "30s"),
            ("PORTAL_STORAGE_BACKEND", "memory"),
            ("PORTAL_LOG_LEVEL", "error"),
            ("PORTAL_LOG_FORMAT", "json"),
        ]);

        let config = loader.load_from_str("{}", ConfigFormat::Json).unwrap();

        assert_eq!(config.api.base_url, "https://override.example");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.storage.backend, StorageBackendKind::Memory);
        assert_eq!(config.logging.level, LogLevel::Error);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_env_override() {
        let loader = isolated().with_env([("PORTAL_STORAGE_BACKEND", "redis")]);
        let err = loader.load_from_str("{}", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");

        assert!(matches!(isolated().load(&path), Err(ConfigError::FileNotFound { .. })));
        assert_eq!(isolated().load_or_default(&path).unwrap(), PortalConfig::default());
    }

    #[test]
    fn test_parse_error_carries_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portal.json");
        fs::write(&path, "{ not json").unwrap();

        let err = isolated().load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unsupported_format() {
        assert!(ConfigFormat::from_path(Path::new("portal.ini")).is_err());
        assert_eq!(
            ConfigFormat::from_path(Path::new("portal.YML")).unwrap(),
            ConfigFormat::Yaml
        );
    }
}
