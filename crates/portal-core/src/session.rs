// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signed-in session and its persisted profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permission::PermissionSet;
use crate::role::{BaseRole, RoleSet};
use crate::router;
use crate::token;

// =============================================================================
// UserProfile
// =============================================================================

/// The cached user profile persisted next to the access token.
///
/// Keys are camelCase so the stored document matches what the web client
/// keeps in browser storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Login name.
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Roles granted to the user.
    #[serde(default)]
    pub roles: RoleSet,
    /// Permissions granted to the user.
    #[serde(default)]
    pub permissions: PermissionSet,
    /// Layout-selecting role, as issued by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_role: Option<String>,
    /// Access token expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Refresh token issued alongside the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl UserProfile {
    /// Creates a profile with no roles or permissions.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    /// Sets the roles.
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<crate::role::Role>,
    {
        self.roles = RoleSet::from_roles(roles);
        self
    }

    /// Sets the permissions.
    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<crate::permission::Permission>,
    {
        self.permissions = PermissionSet::from_permissions(permissions);
        self
    }

    /// Sets the base role.
    pub fn with_base_role(mut self, base_role: impl Into<String>) -> Self {
        self.base_role = Some(base_role.into());
        self
    }

    /// Sets the display name.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Sets the token expiry.
    pub fn with_token_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.token_expires_at = Some(expires_at);
        self
    }

    /// Sets the refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

// =============================================================================
// Session
// =============================================================================

/// A signed-in session.
///
/// A session is valid iff its token is non-empty and not expired. Every
/// predicate on an invalid session answers `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    profile: UserProfile,
}

impl Session {
    /// Creates a session from a token and a profile.
    ///
    /// If the profile carries no expiry, the JWT `exp` claim is used when the
    /// token is a decodable JWT.
    pub fn from_profile(token: impl Into<String>, mut profile: UserProfile) -> Self {
        let token = token.into();
        if profile.token_expires_at.is_none() {
            profile.token_expires_at = token::token_expiry(&token);
        }
        Self { token, profile }
    }

    /// Returns the access token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the refresh token, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        self.profile.refresh_token.as_deref()
    }

    /// Returns the cached profile.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.profile.username
    }

    /// Returns the email.
    pub fn email(&self) -> &str {
        &self.profile.email
    }

    /// Returns the roles.
    pub fn roles(&self) -> &RoleSet {
        &self.profile.roles
    }

    /// Returns the permissions.
    pub fn permissions(&self) -> &PermissionSet {
        &self.profile.permissions
    }

    /// Returns the raw base role as issued by the backend.
    pub fn base_role_name(&self) -> Option<&str> {
        self.profile.base_role.as_deref()
    }

    /// Returns the recognized base role.
    pub fn base_role(&self) -> Option<BaseRole> {
        self.base_role_name().and_then(BaseRole::parse)
    }

    /// Returns the token expiry.
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.profile.token_expires_at
    }

    /// Returns `true` if the session is valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.token.trim().is_empty() {
            return false;
        }
        match self.profile.token_expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }

    /// Returns `true` if the session is valid now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Returns `true` if the token has an expiry in the past.
    pub fn is_expired(&self) -> bool {
        self.profile
            .token_expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }

    /// Returns `true` if the session is valid and holds the permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_valid() && self.profile.permissions.contains(permission)
    }

    /// Returns `true` if the session is valid and holds any of the permissions.
    pub fn has_any_permission<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.is_valid() && self.profile.permissions.contains_any(permissions)
    }

    /// Returns `true` if the session is valid and holds all of the permissions.
    pub fn has_all_permissions<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.is_valid() && self.profile.permissions.contains_all(permissions)
    }

    /// Returns `true` if the session is valid and holds the role.
    pub fn has_role(&self, role: &str) -> bool {
        self.is_valid() && self.profile.roles.contains(role)
    }

    /// Returns `true` if the session is valid and holds any of the roles.
    pub fn has_any_role<R: AsRef<str>>(&self, roles: &[R]) -> bool {
        self.is_valid() && self.profile.roles.contains_any(roles)
    }

    /// Returns the landing path for this session's base role.
    pub fn home_path(&self) -> &'static str {
        router::home_path(self.base_role_name())
    }

    /// Replaces the access token after a refresh.
    ///
    /// The expiry is taken from `expires_at`, falling back to the JWT claim.
    pub fn with_refreshed_token(
        mut self,
        token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
        refresh_token: Option<String>,
    ) -> Self {
        self.token = token.into();
        self.profile.token_expires_at = expires_at.or_else(|| token::token_expiry(&self.token));
        if refresh_token.is_some() {
            self.profile.refresh_token = refresh_token;
        }
        self
    }

    /// Replaces the cached profile, keeping token bookkeeping fields.
    pub fn with_profile(mut self, mut profile: UserProfile) -> Self {
        if profile.token_expires_at.is_none() {
            profile.token_expires_at = self.profile.token_expires_at;
        }
        if profile.refresh_token.is_none() {
            profile.refresh_token = self.profile.refresh_token.take();
        }
        self.profile = profile;
        self
    }

    /// Consumes the session, returning the token and profile.
    pub fn into_parts(self) -> (String, UserProfile) {
        (self.token, self.profile)
    }
}

// =============================================================================
// Tests
// =============================================================================
