// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token and user profile persistence.
//!
//! Every operation is infallible from the caller's point of view. A backend
//! failure is logged at `warn` and treated as "nothing stored"; writes and
//! removals become no-ops.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use portal_core::{Session, StorageError, UserProfile};

use crate::config::StorageKeys;
use crate::traits::StorageBackend;

/// Persists the access token and the cached user profile.
#[derive(Debug, Clone)]
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
    keys: StorageKeys,
}

impl SessionStore {
    /// Creates a store with the default keys.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_keys(backend, StorageKeys::default())
    }

    /// Creates a store with custom keys.
    pub fn with_keys(backend: Arc<dyn StorageBackend>, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Returns the storage keys.
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Returns `true` if the backend can store anything.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    // =========================================================================
    // Token
    // =========================================================================

    /// Stores the access token.
    pub fn set_token(&self, token: &str) {
        self.write(&self.keys.token, token);
    }

    /// Returns the access token.
    pub fn get_token(&self) -> Option<String> {
        self.read(&self.keys.token).filter(|t| !t.is_empty())
    }

    /// Removes the access token.
    pub fn remove_token(&self) {
        self.delete(&self.keys.token);
    }

    // =========================================================================
    // User data
    // =========================================================================

    /// Stores the user data as JSON.
    pub fn set_user_data<T: Serialize>(&self, data: &T) {
        match serde_json::to_string(data) {
            Ok(json) => self.write(&self.keys.user, &json),
            Err(e) => warn!(
                backend = self.backend.name(),
                key = %self.keys.user,
                error = %e,
                "Failed to serialize user data"
            ),
        }
    }

    /// Returns the user data, or `None` if missing or unreadable.
    pub fn get_user_data<T: DeserializeOwned>(&self) -> Option<T> {
        let raw = self.read(&self.keys.user)?;
        match serde_json::from_str(&raw) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key = %self.keys.user,
                    error = %StorageError::from(e),
                    "Discarding unreadable user data"
                );
                None
            }
        }
    }

    /// Removes the user data.
    pub fn remove_user_data(&self) {
        self.delete(&self.keys.user);
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Removes both the token and the user data.
    pub fn clear_auth_data(&self) {
        self.remove_token();
        self.remove_user_data();
        debug!(backend = self.backend.name(), "Auth data cleared");
    }

    /// Returns `true` if both a token and user data are stored.
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some() && self.read(&self.keys.user).is_some()
    }

    /// Rebuilds the stored session, if both entries are present and readable.
    ///
    /// Validity (expiry) is not checked here.
    pub fn hydrate(&self) -> Option<Session> {
        let token = self.get_token()?;
        let profile: UserProfile = self.get_user_data()?;
        Some(Session::from_profile(token, profile))
    }

    /// Stores the session's token and profile.
    pub fn persist(&self, session: &Session) {
        self.set_token(session.token());
        self.set_user_data(session.profile());
    }

    // =========================================================================
    // Backend access
    // =========================================================================

    fn read(&self, key: &str) -> Option<String> {
        if !self.backend.is_available() {
            return None;
        }
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(backend = self.backend.name(), key, error = %e, "Storage read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if !self.backend.is_available() {
            return;
        }
        if let Err(e) = self.backend.set(key, value) {
            warn!(backend = self.backend.name(), key, error = %e, "Storage write failed");
        }
    }

    fn delete(&self, key: &str) {
        if !self.backend.is_available() {
            return;
        }
        if let Err(e) = self.backend.remove(key) {
            warn!(backend = self.backend.name(), key, error = %e, "Storage remove failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
