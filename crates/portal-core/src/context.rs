// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Immutable authentication snapshots.
//!
//! An [`AuthContext`] is what guards and views consult. It pairs the current
//! [`LoadState`] with the session (if any) and answers every predicate in a
//! fail-closed way.

use std::fmt;
use std::sync::Arc;

use crate::role::BaseRole;
use crate::router;
use crate::session::Session;

// =============================================================================
// LoadState
// =============================================================================

/// Outcome of a resolved session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// A valid session is in place.
    Authenticated,
    /// No session is in place.
    Anonymous,
}

/// Session loading state.
///
/// `Unknown -> Checking -> Resolved(..)`. A hydrated session sits in
/// `Checking` while the backend confirms it and is treated as authenticated
/// in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Storage has not been read yet.
    #[default]
    Unknown,
    /// A stored session was found and is being confirmed.
    Checking,
    /// The session check has finished.
    Resolved(Resolution),
}

impl LoadState {
    /// Returns the state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Unknown => "unknown",
            LoadState::Checking => "checking",
            LoadState::Resolved(Resolution::Authenticated) => "authenticated",
            LoadState::Resolved(Resolution::Anonymous) => "anonymous",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// AuthContext
// =============================================================================

/// A point-in-time view of the authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    state: LoadState,
    session: Option<Arc<Session>>,
}

impl AuthContext {
    /// Snapshot before storage has been read.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Snapshot with no session.
    pub fn anonymous() -> Self {
        Self {
            state: LoadState::Resolved(Resolution::Anonymous),
            session: None,
        }
    }

    /// Snapshot with a confirmed session.
    pub fn authenticated(session: impl Into<Arc<Session>>) -> Self {
        Self {
            state: LoadState::Resolved(Resolution::Authenticated),
            session: Some(session.into()),
        }
    }

    /// Snapshot with a hydrated session awaiting confirmation.
    pub fn checking(session: impl Into<Arc<Session>>) -> Self {
        Self {
            state: LoadState::Checking,
            session: Some(session.into()),
        }
    }

    /// Returns the load state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Returns the session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    /// Returns `true` until storage has been read.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Unknown)
    }

    /// Returns `true` if a valid session is in place.
    ///
    /// A `Checking` session counts as authenticated.
    pub fn is_authenticated(&self) -> bool {
        match self.state {
            LoadState::Checking | LoadState::Resolved(Resolution::Authenticated) => {
                self.valid_session().is_some()
            }
            _ => false,
        }
    }

    fn valid_session(&self) -> Option<&Session> {
        self.session.as_deref().filter(|s| s.is_valid())
    }

    fn authenticated_session(&self) -> Option<&Session> {
        if self.is_authenticated() {
            self.session.as_deref()
        } else {
            None
        }
    }

    /// Returns the username of the authenticated user.
    pub fn username(&self) -> Option<&str> {
        self.authenticated_session().map(Session::username)
    }

    /// Returns `true` if the authenticated user holds the permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.authenticated_session()
            .is_some_and(|s| s.has_permission(permission))
    }

    /// Returns `true` if the authenticated user holds any of the permissions.
    pub fn has_any_permission<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.authenticated_session()
            .is_some_and(|s| s.has_any_permission(permissions))
    }

    /// Returns `true` if the authenticated user holds all of the permissions.
    pub fn has_all_permissions<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.authenticated_session()
            .is_some_and(|s| s.has_all_permissions(permissions))
    }

    /// Returns `true` if the authenticated user holds the role.
    pub fn has_role(&self, role: &str) -> bool {
        self.authenticated_session().is_some_and(|s| s.has_role(role))
    }

    /// Returns `true` if the authenticated user holds any of the roles.
    pub fn has_any_role<R: AsRef<str>>(&self, roles: &[R]) -> bool {
        self.authenticated_session()
            .is_some_and(|s| s.has_any_role(roles))
    }

    /// Returns the recognized base role of the authenticated user.
    pub fn base_role(&self) -> Option<BaseRole> {
        self.authenticated_session().and_then(Session::base_role)
    }

    /// Returns the raw base role of the authenticated user.
    pub fn base_role_name(&self) -> Option<&str> {
        self.authenticated_session().and_then(Session::base_role_name)
    }

    /// Returns the landing path for the current user.
    pub fn home_path(&self) -> &'static str {
        router::home_path(self.base_role_name())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserProfile;
    use chrono::{Duration, Utc};

    fn admin_session() -> Session {
        Session::from_profile(
            "token-abc",
            UserProfile::new("admin", "admin@clinic.example")
                .with_roles(["ROLE_ADMIN"])
                .with_permissions(["VIEW_EMPLOYEE", "EDIT_EMPLOYEE"])
                .with_base_role("admin"),
        )
    }

    #[test]
    fn test_unknown_is_loading() {
        let ctx = AuthContext::unknown();
        assert!(ctx.is_loading());
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.state().to_string(), "unknown");
    }

    #[test]
    fn test_checking_is_optimistically_authenticated() {
        let ctx = AuthContext::checking(admin_session());
        assert!(!ctx.is_loading());
        assert!(ctx.is_authenticated());
        assert!(ctx.has_permission("VIEW_EMPLOYEE"));
    }

    #[test]
    fn test_anonymous_fails_closed() {
        let ctx = AuthContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(!ctx.has_permission("VIEW_EMPLOYEE"));
        assert!(!ctx.has_any_role(&["ADMIN"]));
        assert!(ctx.username().is_none());
        assert_eq!(ctx.home_path(), "/patient");
    }

    #[test]
    fn test_expired_session_is_not_authenticated() {
        let profile = UserProfile::new("admin", "")
            .with_permissions(["VIEW_EMPLOYEE"])
            .with_token_expires_at(Utc::now() - Duration::seconds(1));
        let ctx = AuthContext::authenticated(Session::from_profile("token", profile));

        assert!(!ctx.is_authenticated());
        assert!(!ctx.has_permission("VIEW_EMPLOYEE"));
    }

    #[test]
    fn test_all_implies_any() {
        let ctx = AuthContext::authenticated(admin_session());
        let perms = ["VIEW_EMPLOYEE", "EDIT_EMPLOYEE"];

        assert!(ctx.has_all_permissions(&perms));
        assert!(ctx.has_any_permission(&perms));
    }

    #[test]
    fn test_home_path_follows_base_role() {
        let ctx = AuthContext::authenticated(admin_session());
        assert_eq!(ctx.base_role(), Some(BaseRole::Admin));
        assert_eq!(ctx.home_path(), "/admin");
    }
}
