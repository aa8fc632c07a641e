// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session manager.
//!
//! Owns the signed-in session for one client context. The current
//! [`AuthContext`] lives in a `watch` channel so guards can re-evaluate on
//! every change; mutating operations are serialized by an async mutex so
//! snapshots never interleave.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► init ──► validate ──► login / logout / refresh ──► dispose
//!        (sync)     (async)
//! ```
//!
//! `init` reads the store unless an operation is already running. A stored,
//! unexpired session becomes [`LoadState::Checking`] and counts as
//! authenticated right away; `validate` then confirms it with the backend.
//! Anything else clears the store and resolves to anonymous.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use portal_core::{AuthContext, AuthError, AuthResult, LoadState, Session};
use portal_store::SessionStore;

use crate::client::{AuthClient, Credentials};

/// Owns the current session and publishes auth snapshots.
#[derive(Debug)]
pub struct SessionManager {
    store: SessionStore,
    client: Arc<dyn AuthClient>,
    state: watch::Sender<AuthContext>,
    op_lock: Mutex<()>,
}

impl SessionManager {
    /// Creates a manager in the [`LoadState::Unknown`] state.
    pub fn new(store: SessionStore, client: Arc<dyn AuthClient>) -> Self {
        let (state, _) = watch::channel(AuthContext::unknown());
        Self {
            store,
            client,
            state,
            op_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Hydrates from the store.
    ///
    /// Does nothing while another operation holds the lock, so an in-flight
    /// sign-in is never overwritten by a stale hydration.
    pub fn init(&self) -> LoadState {
        let Ok(_guard) = self.op_lock.try_lock() else {
            debug!("Operation in flight, skipping hydration");
            return self.state();
        };

        let ctx = match self.store.hydrate() {
            Some(session) if session.is_valid() => {
                debug!(username = session.username(), "Hydrated stored session");
                AuthContext::checking(session)
            }
            Some(session) => {
                info!(username = session.username(), "Stored session expired, clearing");
                self.store.clear_auth_data();
                AuthContext::anonymous()
            }
            None => {
                // A lone token or unreadable profile is useless.
                self.store.clear_auth_data();
                AuthContext::anonymous()
            }
        };
        let state = ctx.state();
        self.publish(ctx);
        state
    }

    /// Confirms a hydrated session with the backend.
    ///
    /// Only acts in [`LoadState::Checking`]. Success refreshes the cached
    /// profile; any failure signs the user out locally.
    pub async fn validate(&self) -> AuthContext {
        let _guard = self.op_lock.lock().await;

        let current = self.snapshot();
        let checking = match current.session() {
            Some(session) if current.state() == LoadState::Checking => Some(session.clone()),
            _ => None,
        };
        let Some(session) = checking else {
            return current;
        };

        match self.client.current_user(session.token()).await {
            Ok(profile) => {
                let session = session.with_profile(profile);
                self.store.persist(&session);
                debug!(username = session.username(), "Session confirmed");
                self.publish(AuthContext::authenticated(session))
            }
            Err(e) => {
                warn!(
                    client = self.client.name(),
                    error = %e,
                    error_type = e.error_type(),
                    "Session validation failed, signing out"
                );
                self.store.clear_auth_data();
                self.publish(AuthContext::anonymous())
            }
        }
    }

    /// Runs [`init`](Self::init) then [`validate`](Self::validate).
    pub async fn start(&self) -> AuthContext {
        self.init();
        self.validate().await
    }

    /// Returns to [`LoadState::Unknown`] without touching storage.
    pub fn dispose(&self) {
        self.publish(AuthContext::unknown());
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Signs in.
    ///
    /// Blank credentials are rejected without contacting the backend. On
    /// failure the state is anonymous.
    pub async fn login(&self, credentials: Credentials) -> AuthResult<Session> {
        credentials.validate()?;

        let _guard = self.op_lock.lock().await;

        let result = match self.client.login(&credentials).await {
            Ok(response) => response.into_session(&credentials.username),
            Err(e) => Err(e),
        };

        match result {
            Ok(session) => {
                self.store.persist(&session);
                info!(
                    username = session.username(),
                    base_role = session.base_role_name().unwrap_or("-"),
                    "Signed in"
                );
                self.publish(AuthContext::authenticated(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Sign-in failed");
                self.store.clear_auth_data();
                self.publish(AuthContext::anonymous());
                Err(e)
            }
        }
    }

    /// Signs out.
    ///
    /// Local state is cleared before the backend is notified; a failed
    /// notification is only logged. Calling this without a session is a no-op
    /// apart from clearing the store.
    pub async fn logout(&self) {
        let _guard = self.op_lock.lock().await;

        let token = self
            .snapshot()
            .session()
            .map(|s| s.token().to_string())
            .or_else(|| self.store.get_token());

        self.store.clear_auth_data();
        self.publish(AuthContext::anonymous());

        let Some(token) = token else {
            debug!("Sign-out without a session");
            return;
        };

        info!("Signed out");
        if let Err(e) = self.client.logout(&token).await {
            warn!(client = self.client.name(), error = %e, "Backend sign-out failed");
        }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// A rejected refresh signs the user out; a transport failure keeps the
    /// current session.
    pub async fn refresh(&self) -> AuthResult<Session> {
        let _guard = self.op_lock.lock().await;

        let current = self.snapshot();
        let session = match current.session() {
            Some(session) if current.is_authenticated() || session.is_expired() => session.clone(),
            _ => return Err(AuthError::NotAuthenticated),
        };
        let refresh_token = session
            .refresh_token()
            .map(str::to_string)
            .ok_or(AuthError::NotAuthenticated)?;

        match self.client.refresh(&refresh_token).await {
            Ok(response) => {
                if response.token.trim().is_empty() {
                    return Err(AuthError::invalid_response("refresh response carried no token"));
                }
                let expires_at = response.expires_at(chrono::Utc::now());
                let session =
                    session.with_refreshed_token(response.token, expires_at, response.refresh_token);
                self.store.persist(&session);
                debug!(username = session.username(), "Access token refreshed");
                self.publish(AuthContext::authenticated(session.clone()));
                Ok(session)
            }
            Err(e) if e.invalidates_session() => {
                warn!(error = %e, "Refresh rejected, signing out");
                self.store.clear_auth_data();
                self.publish(AuthContext::anonymous());
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed");
                Err(e)
            }
        }
    }

    // =========================================================================
    // Snapshot access
    // =========================================================================

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> AuthContext {
        self.state.borrow().clone()
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthContext> {
        self.state.subscribe()
    }

    /// Returns the session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Returns the current load state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().state()
    }

    /// Returns `true` until storage has been read.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Returns `true` if a valid session is in place.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Returns the current session.
    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// See [`AuthContext::has_permission`].
    pub fn has_permission(&self, permission: &str) -> bool {
        self.state.borrow().has_permission(permission)
    }

    /// See [`AuthContext::has_any_permission`].
    pub fn has_any_permission<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.state.borrow().has_any_permission(permissions)
    }

    /// See [`AuthContext::has_all_permissions`].
    pub fn has_all_permissions<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.state.borrow().has_all_permissions(permissions)
    }

    /// See [`AuthContext::has_role`].
    pub fn has_role(&self, role: &str) -> bool {
        self.state.borrow().has_role(role)
    }

    /// See [`AuthContext::has_any_role`].
    pub fn has_any_role<R: AsRef<str>>(&self, roles: &[R]) -> bool {
        self.state.borrow().has_any_role(roles)
    }

    /// Returns the landing path for the current user.
    pub fn home_path(&self) -> &'static str {
        self.state.borrow().home_path()
    }

    fn publish(&self, ctx: AuthContext) -> AuthContext {
        debug!(state = %ctx.state(), "Auth state published");
        self.state.send_replace(ctx.clone());
        ctx
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LoginResponse;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use parking_lot::Mutex as SyncMutex;
    use portal_core::UserProfile;
    use portal_store::MemoryStorage;
    use tokio::sync::Notify;

    #[derive(Debug, Default)]
    struct ScriptedClient {
        reject_login: bool,
        reject_profile: bool,
        fail_logout: bool,
        hold_login: Option<Arc<Notify>>,
        calls: SyncMutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl AuthClient for ScriptedClient {
        async fn login(&self, credentials: &Credentials) -> AuthResult<LoginResponse> {
            self.calls.lock().push(format!("login:{}", credentials.username));
            if let Some(gate) = &self.hold_login {
                gate.notified().await;
            }
            if self.reject_login {
                return Err(AuthError::rejected(401, "Invalid username or password"));
            }
            Ok(LoginResponse {
                token: "fresh-token".to_string(),
                refresh_token: Some("refresh-1".to_string()),
                roles: vec!["ROLE_EMPLOYEE".to_string()],
                permissions: vec!["VIEW_PATIENT".to_string()],
                base_role: Some("employee".to_string()),
                expires_in: Some(3600),
                ..Default::default()
            })
        }

        async fn logout(&self, token: &str) -> AuthResult<()> {
            self.calls.lock().push(format!("logout:{token}"));
            if self.fail_logout {
                return Err(AuthError::transport("connection refused"));
            }
            Ok(())
        }

        async fn current_user(&self, token: &str) -> AuthResult<UserProfile> {
            self.calls.lock().push(format!("me:{token}"));
            if self.reject_profile {
                return Err(AuthError::hydration("token revoked"));
            }
            Ok(UserProfile::new("dr.kim", "kim@clinic.example")
                .with_roles(["EMPLOYEE"])
                .with_permissions(["VIEW_PATIENT", "VIEW_APPOINTMENT"])
                .with_base_role("employee"))
        }

        async fn refresh(&self, refresh_token: &str) -> AuthResult<LoginResponse> {
            self.calls.lock().push(format!("refresh:{refresh_token}"));
            Ok(LoginResponse {
                token: "rotated-token".to_string(),
                expires_in: Some(7200),
                ..Default::default()
            })
        }
    }

    fn manager_with(client: ScriptedClient) -> (SessionManager, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        (SessionManager::new(store, client.clone()), client)
    }

    fn stored_session(expires_in: Duration) -> Session {
        Session::from_profile(
            "stored-token",
            UserProfile::new("dr.kim", "kim@clinic.example")
                .with_permissions(["VIEW_PATIENT"])
                .with_base_role("employee")
                .with_token_expires_at(Utc::now() + expires_in),
        )
    }

    #[test]
    fn test_new_manager_is_loading() {
        let (manager, _) = manager_with(ScriptedClient::default());
        assert!(manager.is_loading());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_init_without_session_is_anonymous() {
        let (manager, _) = manager_with(ScriptedClient::default());
        let state = manager.init();

        assert_eq!(state, LoadState::Resolved(portal_core::Resolution::Anonymous));
        assert!(!manager.is_loading());
        assert!(!manager.has_permission("VIEW_PATIENT"));
    }

    #[test]
    fn test_init_with_stored_session_is_checking() {
        let (manager, _) = manager_with(ScriptedClient::default());
        manager.store().persist(&stored_session(Duration::hours(1)));

        assert_eq!(manager.init(), LoadState::Checking);
        assert!(manager.is_authenticated());
        assert!(manager.has_permission("VIEW_PATIENT"));
        assert_eq!(manager.home_path(), "/employee");
    }

    #[test]
    fn test_init_with_expired_session_clears_store() {
        let (manager, _) = manager_with(ScriptedClient::default());
        manager.store().persist(&stored_session(-Duration::minutes(1)));

        manager.init();

        assert!(!manager.is_authenticated());
        assert!(!manager.store().is_authenticated());
    }

    #[test]
    fn test_init_with_token_only_clears_store() {
        let (manager, _) = manager_with(ScriptedClient::default());
        manager.store().set_token("orphan");

        manager.init();

        assert!(!manager.is_authenticated());
        assert_eq!(manager.store().get_token(), None);
    }

    #[tokio::test]
    async fn test_validate_refreshes_profile() {
        let (manager, client) = manager_with(ScriptedClient::default());
        manager.store().persist(&stored_session(Duration::hours(1)));

        let ctx = manager.start().await;

        assert_eq!(ctx.state(), LoadState::Resolved(portal_core::Resolution::Authenticated));
        assert!(manager.has_permission("VIEW_APPOINTMENT"));
        assert_eq!(client.calls(), vec!["me:stored-token"]);
    }

    #[tokio::test]
    async fn test_validate_failure_signs_out() {
        let (manager, _) = manager_with(ScriptedClient {
            reject_profile: true,
            ..Default::default()
        });
        manager.store().persist(&stored_session(Duration::hours(1)));

        let ctx = manager.start().await;

        assert!(!ctx.is_authenticated());
        assert!(!manager.store().is_authenticated());
    }

    #[tokio::test]
    async fn test_validate_when_resolved_is_noop() {
        let (manager, client) = manager_with(ScriptedClient::default());
        manager.init();
        manager.validate().await;
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_login_success() {
        let (manager, _) = manager_with(ScriptedClient::default());
        manager.init();

        let session = manager.login(Credentials::new("dr.kim", "pw")).await.unwrap();

        assert_eq!(session.username(), "dr.kim");
        assert!(manager.is_authenticated());
        assert!(manager.has_role("EMPLOYEE"));
        assert!(manager.store().is_authenticated());
        assert_eq!(manager.store().get_token().as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (manager, _) = manager_with(ScriptedClient {
            reject_login: true,
            ..Default::default()
        });
        manager.init();

        let err = manager.login(Credentials::new("dr.kim", "wrong")).await.unwrap_err();

        match err {
            AuthError::AuthenticationFailed { message, status } => {
                assert_eq!(message, "Invalid username or password");
                assert_eq!(status, Some(401));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!manager.is_authenticated());
        assert!(!manager.is_loading());
    }

    #[tokio::test]
    async fn test_init_during_login_keeps_login_result() {
        let gate = Arc::new(Notify::new());
        let (manager, _) = manager_with(ScriptedClient {
            hold_login: Some(gate.clone()),
            ..Default::default()
        });
        let manager = Arc::new(manager);

        let login = tokio::spawn({
            let manager = manager.clone();
            async move { manager.login(Credentials::new("dr.kim", "pw")).await }
        });
        while manager.op_lock.try_lock().is_ok() {
            tokio::task::yield_now().await;
        }

        assert_eq!(manager.init(), LoadState::Unknown);
        assert!(manager.is_loading());

        gate.notify_one();
        login.await.unwrap().unwrap();

        assert!(manager.is_authenticated());
        assert!(manager.store().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_blank_credentials_skip_backend() {
        let (manager, client) = manager_with(ScriptedClient::default());
        assert!(manager.login(Credentials::new("", "pw")).await.is_err());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let (manager, client) = manager_with(ScriptedClient {
            fail_logout: true,
            ..Default::default()
        });
        manager.init();
        manager.login(Credentials::new("dr.kim", "pw")).await.unwrap();

        manager.logout().await;

        assert!(!manager.is_authenticated());
        assert!(!manager.store().is_authenticated());
        assert_eq!(client.calls().last().map(String::as_str), Some("logout:fresh-token"));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (manager, client) = manager_with(ScriptedClient::default());
        manager.init();
        manager.login(Credentials::new("dr.kim", "pw")).await.unwrap();

        manager.logout().await;
        manager.logout().await;

        let logouts = client.calls().iter().filter(|c| c.starts_with("logout:")).count();
        assert_eq!(logouts, 1);
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let (manager, client) = manager_with(ScriptedClient::default());
        manager.init();
        manager.login(Credentials::new("dr.kim", "pw")).await.unwrap();

        let session = manager.refresh().await.unwrap();

        assert_eq!(session.token(), "rotated-token");
        assert_eq!(session.refresh_token(), Some("refresh-1"));
        assert_eq!(manager.store().get_token().as_deref(), Some("rotated-token"));
        assert!(client.calls().contains(&"refresh:refresh-1".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_without_session() {
        let (manager, _) = manager_with(ScriptedClient::default());
        manager.init();
        assert!(matches!(manager.refresh().await, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (manager, _) = manager_with(ScriptedClient::default());
        let mut rx = manager.subscribe();
        manager.init();

        manager.login(Credentials::new("dr.kim", "pw")).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        manager.logout().await;
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_dispose_keeps_storage() {
        let (manager, _) = manager_with(ScriptedClient::default());
        manager.init();
        manager.login(Credentials::new("dr.kim", "pw")).await.unwrap();

        manager.dispose();

        assert!(manager.is_loading());
        assert!(manager.store().is_authenticated());
    }
}
