// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! - [`MockAuthClient`]: in-process [`AuthClient`] backed by fixture users
//! - [`FailingStorage`]: storage backend whose every call fails

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use portal_auth::{AuthClient, Credentials, LoginResponse};
use portal_core::{AuthError, AuthResult, StorageError, StorageResult, UserProfile};
use portal_store::StorageBackend;

use crate::common::fixtures::{TestUser, TokenFixtures, PASSWORD};

// =============================================================================
// MockAuthClient
// =============================================================================

#[derive(Debug, Default)]
struct MockState {
    users: HashMap<String, TestUser>,
    access_tokens: HashMap<String, String>,
    refresh_tokens: HashMap<String, String>,
    calls: Vec<String>,
}

/// Auth client that issues tokens for registered fixture users.
#[derive(Debug, Default)]
pub struct MockAuthClient {
    state: Mutex<MockState>,
    issued: AtomicU64,
    offline: AtomicBool,
    reject_profiles: AtomicBool,
    fail_logout: AtomicBool,
}

impl MockAuthClient {
    /// Creates a client with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers users who may sign in with [`PASSWORD`].
    pub fn with_users(self, users: impl IntoIterator<Item = TestUser>) -> Self {
        {
            let mut state = self.state.lock();
            for user in users {
                state.users.insert(user.username.to_string(), user);
            }
        }
        self
    }

    /// Makes every call fail with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes profile lookups reject every token.
    pub fn set_reject_profiles(&self, reject: bool) {
        self.reject_profiles.store(reject, Ordering::SeqCst);
    }

    /// Makes logout fail.
    pub fn set_fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// Accepts `token` for `user` as if issued earlier.
    pub fn accept_token(&self, token: impl Into<String>, user: &TestUser) {
        let mut state = self.state.lock();
        state.users.insert(user.username.to_string(), user.clone());
        state
            .access_tokens
            .insert(token.into(), user.username.to_string());
    }

    /// Revokes an access token.
    pub fn revoke(&self, token: &str) {
        self.state.lock().access_tokens.remove(token);
    }

    /// Operations called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Number of calls to `operation`.
    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    fn record(&self, operation: &str) -> AuthResult<()> {
        self.state.lock().calls.push(operation.to_string());
        if self.offline.load(Ordering::SeqCst) {
            return Err(AuthError::transport("connection refused"));
        }
        Ok(())
    }

    fn issue(&self, state: &mut MockState, user: &TestUser) -> LoginResponse {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = TokenFixtures::signed(
            user.username,
            chrono::Utc::now() + chrono::Duration::hours(1),
            n,
        );
        let refresh = format!("refresh-{}-{n}", user.username);
        state
            .access_tokens
            .insert(token.clone(), user.username.to_string());
        state
            .refresh_tokens
            .insert(refresh.clone(), user.username.to_string());
        user.login_response(token, Some(refresh))
    }
}

#[async_trait]
impl AuthClient for MockAuthClient {
    async fn login(&self, credentials: &Credentials) -> AuthResult<LoginResponse> {
        self.record("login")?;
        let mut state = self.state.lock();
        let user = state
            .users
            .get(&credentials.username)
            .filter(|_| credentials.password == PASSWORD)
            .cloned()
            .ok_or_else(|| AuthError::rejected(401, "Invalid username or password"))?;
        Ok(self.issue(&mut state, &user))
    }

    async fn logout(&self, token: &str) -> AuthResult<()> {
        self.record("logout")?;
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(AuthError::rejected(500, "Logout failed"));
        }
        self.revoke(token);
        Ok(())
    }

    async fn current_user(&self, token: &str) -> AuthResult<UserProfile> {
        self.record("current_user")?;
        if self.reject_profiles.load(Ordering::SeqCst) {
            return Err(AuthError::hydration("Session is no longer valid"));
        }
        let state = self.state.lock();
        state
            .access_tokens
            .get(token)
            .and_then(|username| state.users.get(username))
            .map(TestUser::profile)
            .ok_or_else(|| AuthError::hydration("Session is no longer valid"))
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<LoginResponse> {
        self.record("refresh")?;
        let mut state = self.state.lock();
        let user = state
            .refresh_tokens
            .remove(refresh_token)
            .and_then(|username| state.users.get(&username).cloned())
            .ok_or_else(|| AuthError::rejected(401, "Refresh token expired"))?;
        let mut response = self.issue(&mut state, &user);
        response.expires_in = Some(900);
        Ok(response)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// FailingStorage
// =============================================================================

/// Storage that claims to be available but fails every operation.
#[derive(Debug, Default)]
pub struct FailingStorage {
    attempts: AtomicU64,
}

impl FailingStorage {
    /// Creates the backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations attempted.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail(&self) -> StorageError {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        StorageError::unavailable("quota exceeded")
    }
}

impl StorageBackend for FailingStorage {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(self.fail())
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(self.fail())
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(self.fail())
    }
}
