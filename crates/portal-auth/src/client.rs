// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication backend seam.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use portal_core::{AuthError, AuthResult, Session, UserProfile};

// =============================================================================
// Credentials
// =============================================================================

/// Username and password submitted at login.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Rejects blank usernames and empty passwords before any network call.
    pub fn validate(&self) -> AuthResult<()> {
        if self.username.trim().is_empty() {
            return Err(AuthError::authentication_failed("Username is required"));
        }
        if self.password.is_empty() {
            return Err(AuthError::authentication_failed("Password is required"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// LoginResponse
// =============================================================================

/// Body returned by the login and refresh endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token.
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,

    /// Refresh token.
    #[serde(default, alias = "refresh_token", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Login name; falls back to the submitted username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name.
    #[serde(default, alias = "full_name", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Granted roles.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Granted permissions.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Layout-selecting role.
    #[serde(default, alias = "base_role", skip_serializing_if = "Option::is_none")]
    pub base_role: Option<String>,

    /// Token lifetime in seconds.
    #[serde(default, alias = "expires_in", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl LoginResponse {
    /// Returns the expiry implied by `expires_in`, counted from `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
    }

    /// Builds the session this response grants.
    ///
    /// Without `expiresIn` the expiry comes from the token's `exp` claim.
    pub fn into_session(self, fallback_username: &str) -> AuthResult<Session> {
        if self.token.trim().is_empty() {
            return Err(AuthError::invalid_response("login response carried no token"));
        }

        let expires_at = self.expires_at(Utc::now());
        let username = self
            .username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| fallback_username.to_string());

        let mut profile = UserProfile::new(username, self.email.unwrap_or_default())
            .with_roles(self.roles)
            .with_permissions(self.permissions);
        profile.base_role = self.base_role;
        profile.full_name = self.full_name;
        profile.refresh_token = self.refresh_token;
        profile.token_expires_at = expires_at;

        Ok(Session::from_profile(self.token, profile))
    }
}

// =============================================================================
// AuthClient
// =============================================================================

/// The authentication backend.
#[async_trait]
pub trait AuthClient: Send + Sync + fmt::Debug {
    /// Exchanges credentials for a token and profile.
    async fn login(&self, credentials: &Credentials) -> AuthResult<LoginResponse>;

    /// Ends the session on the backend.
    async fn logout(&self, token: &str) -> AuthResult<()>;

    /// Returns the profile of the token's owner; fails if the token is no longer accepted.
    async fn current_user(&self, token: &str) -> AuthResult<UserProfile>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> AuthResult<LoginResponse>;

    /// Client name for logs.
    fn name(&self) -> &str {
        "auth"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("dr.kim", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("dr.kim"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("dr.kim", "pw").validate().is_ok());
        assert!(Credentials::new("  ", "pw").validate().is_err());
        assert!(Credentials::new("dr.kim", "").validate().is_err());
    }

    #[test]
    fn test_login_response_aliases() {
        let response: LoginResponse = serde_json::from_value(serde_json::json!({
            "accessToken": "abc",
            "refreshToken": "def",
            "roles": ["ROLE_MANAGER"],
            "permissions": ["VIEW_REPORT"],
            "baseRole": "manager",
            "expiresIn": 3600
        }))
        .unwrap();

        assert_eq!(response.token, "abc");
        assert_eq!(response.refresh_token.as_deref(), Some("def"));
        assert_eq!(response.base_role.as_deref(), Some("manager"));
        assert_eq!(response.expires_in, Some(3600));
    }

    #[test]
    fn test_into_session() {
        let response = LoginResponse {
            token: "abc".to_string(),
            roles: vec!["ROLE_MANAGER".to_string()],
            permissions: vec!["VIEW_REPORT".to_string()],
            base_role: Some("manager".to_string()),
            expires_in: Some(600),
            ..Default::default()
        };

        let session = response.into_session("mgr.park").unwrap();
        assert_eq!(session.username(), "mgr.park");
        assert!(session.has_role("MANAGER"));
        assert!(session.has_permission("VIEW_REPORT"));
        assert_eq!(session.home_path(), "/manager");
        assert!(session.token_expires_at().unwrap() > Utc::now());
    }

    #[test]
    fn test_into_session_requires_token() {
        let err = LoginResponse::default().into_session("x").unwrap_err();
        assert!(matches!(err, AuthError::InvalidResponse { .. }));
    }
}
