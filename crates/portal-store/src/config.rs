// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Storage configuration.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use portal_core::{StorageError, StorageResult};

use crate::detached::DetachedStorage;
use crate::file::FileStorage;
use crate::memory::MemoryStorage;
use crate::traits::StorageBackend;

/// Which backend holds the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// Forget the session when the process exits.
    Memory,
    /// Persist the session to a JSON file.
    #[default]
    File,
    /// Keep no session at all.
    Detached,
}

impl StorageBackendKind {
    /// Returns the backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackendKind::Memory => "memory",
            StorageBackendKind::File => "file",
            StorageBackendKind::Detached => "detached",
        }
    }

    /// Parses a backend name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Some(StorageBackendKind::Memory),
            "file" | "local" => Some(StorageBackendKind::File),
            "detached" | "none" => Some(StorageBackendKind::Detached),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage keys for the two persisted entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Key of the access token.
    #[serde(default = "default_token_key")]
    pub token: String,
    /// Key of the serialized user profile.
    #[serde(default = "default_user_key")]
    pub user: String,
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_user_key() -> String {
    "user".to_string()
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: default_token_key(),
            user: default_user_key(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackendKind,

    /// File path for the file backend.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Entry keys.
    #[serde(default)]
    pub keys: StorageKeys,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".portal/session.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            path: default_storage_path(),
            keys: StorageKeys::default(),
        }
    }
}

impl StorageConfig {
    /// Configuration for an in-memory backend.
    pub fn memory() -> Self {
        Self {
            backend: StorageBackendKind::Memory,
            ..Default::default()
        }
    }

    /// Configuration for a file backend at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackendKind::File,
            path: path.into(),
            ..Default::default()
        }
    }
}

/// Opens the configured backend.
pub fn open_backend(config: &StorageConfig) -> StorageResult<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match config.backend {
        StorageBackendKind::Memory => Arc::new(MemoryStorage::new()),
        StorageBackendKind::File => {
            if config.path.as_os_str().is_empty() {
                return Err(StorageError::unavailable("file backend requires a path"));
            }
            Arc::new(FileStorage::new(&config.path))
        }
        StorageBackendKind::Detached => Arc::new(DetachedStorage::new()),
    };
    tracing::debug!(backend = backend.name(), path = %config.path.display(), "Storage backend opened");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(StorageBackendKind::parse("FILE"), Some(StorageBackendKind::File));
        assert_eq!(StorageBackendKind::parse("memory"), Some(StorageBackendKind::Memory));
        assert_eq!(StorageBackendKind::parse("none"), Some(StorageBackendKind::Detached));
        assert_eq!(StorageBackendKind::parse("redis"), None);
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackendKind::File);
        assert_eq!(config.keys.token, "token");
        assert_eq!(config.keys.user, "user");
    }

    #[test]
    fn test_open_backend() {
        let backend = open_backend(&StorageConfig::memory()).unwrap();
        assert_eq!(backend.name(), "memory");

        let detached = StorageConfig {
            backend: StorageBackendKind::Detached,
            ..Default::default()
        };
        assert!(!open_backend(&detached).unwrap().is_available());
    }

    #[test]
    fn test_file_backend_requires_path() {
        let config = StorageConfig::file("");
        assert!(open_backend(&config).is_err());
    }
}
