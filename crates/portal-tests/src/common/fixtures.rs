// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Clinic staff and patients with the roles and permissions the default
//! route table expects, plus backend-style signed tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use portal_auth::{Credentials, LoginResponse};
use portal_core::{BaseRole, Session, UserProfile};

/// Secret the mock backend signs with. The portal never sees it.
pub const BACKEND_SECRET: &[u8] = b"mock-backend-signing-secret";

/// Password shared by every fixture user.
pub const PASSWORD: &str = "correct horse battery staple";

// =============================================================================
// Tokens
// =============================================================================

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    exp: i64,
    jti: u64,
}

/// Backend-style JWT access tokens.
pub struct TokenFixtures;

impl TokenFixtures {
    /// A token for `sub` expiring at `exp`.
    pub fn signed(sub: &str, exp: DateTime<Utc>, jti: u64) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub,
                exp: exp.timestamp(),
                jti,
            },
            &EncodingKey::from_secret(BACKEND_SECRET),
        )
        .expect("Failed to sign token")
    }

    /// A token valid for one hour.
    pub fn valid(sub: &str) -> String {
        Self::signed(sub, Utc::now() + Duration::hours(1), 0)
    }

    /// A token that expired an hour ago.
    pub fn expired(sub: &str) -> String {
        Self::signed(sub, Utc::now() - Duration::hours(1), 0)
    }
}

// =============================================================================
// Users
// =============================================================================

/// A fixture account.
#[derive(Debug, Clone)]
pub struct TestUser {
    /// Login name.
    pub username: &'static str,
    /// Base role.
    pub base_role: Option<BaseRole>,
    /// Roles as issued by the backend.
    pub roles: &'static [&'static str],
    /// Permissions.
    pub permissions: &'static [&'static str],
}

impl TestUser {
    /// Credentials with the shared password.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username, PASSWORD)
    }

    /// The user's profile.
    pub fn profile(&self) -> UserProfile {
        let mut profile = UserProfile::new(self.username, format!("{}@clinic.example", self.username))
            .with_roles(self.roles.iter().copied())
            .with_permissions(self.permissions.iter().copied());
        if let Some(base_role) = self.base_role {
            profile = profile.with_base_role(base_role.as_str().to_uppercase());
        }
        profile
    }

    /// A session with a valid token.
    pub fn session(&self) -> Session {
        Session::from_profile(TokenFixtures::valid(self.username), self.profile())
    }

    /// A session whose token has expired.
    pub fn expired_session(&self) -> Session {
        Session::from_profile(TokenFixtures::expired(self.username), self.profile())
    }

    /// The login response the backend would send for this user.
    pub fn login_response(&self, token: String, refresh_token: Option<String>) -> LoginResponse {
        LoginResponse {
            token,
            refresh_token,
            username: Some(self.username.to_string()),
            email: Some(format!("{}@clinic.example", self.username)),
            full_name: None,
            roles: self.roles.iter().map(|r| r.to_string()).collect(),
            permissions: self.permissions.iter().map(|p| p.to_string()).collect(),
            base_role: self.base_role.map(|r| r.as_str().to_uppercase()),
            expires_in: None,
        }
    }
}

/// Fixture accounts for every layout.
pub struct Users;

impl Users {
    /// Clinic administrator.
    pub fn admin() -> TestUser {
        TestUser {
            username: "admin.park",
            base_role: Some(BaseRole::Admin),
            roles: &["ROLE_ADMIN"],
            permissions: &["VIEW_EMPLOYEE", "EDIT_EMPLOYEE", "VIEW_REPORT"],
        }
    }

    /// Branch manager.
    pub fn manager() -> TestUser {
        TestUser {
            username: "manager.choi",
            base_role: Some(BaseRole::Manager),
            roles: &["ROLE_MANAGER"],
            permissions: &["VIEW_REPORT", "VIEW_EMPLOYEE"],
        }
    }

    /// Front-desk employee.
    pub fn employee() -> TestUser {
        TestUser {
            username: "dr.kim",
            base_role: Some(BaseRole::Employee),
            roles: &["ROLE_EMPLOYEE", "ROLE_DENTIST"],
            permissions: &["VIEW_PATIENT", "VIEW_APPOINTMENT"],
        }
    }

    /// Accountant.
    pub fn accountant() -> TestUser {
        TestUser {
            username: "acc.lee",
            base_role: Some(BaseRole::Accountant),
            roles: &["ROLE_ACCOUNTANT"],
            permissions: &["VIEW_INVOICE"],
        }
    }

    /// Warehouse clerk allowed to view but not export.
    pub fn warehouse() -> TestUser {
        TestUser {
            username: "wh.jung",
            base_role: Some(BaseRole::Warehouse),
            roles: &["ROLE_WAREHOUSE"],
            permissions: &["VIEW_WAREHOUSE"],
        }
    }

    /// Patient.
    pub fn patient() -> TestUser {
        TestUser {
            username: "patient.han",
            base_role: Some(BaseRole::Patient),
            roles: &["ROLE_PATIENT"],
            permissions: &[],
        }
    }

    /// Account without a base role; lands on the fallback layout.
    pub fn unassigned() -> TestUser {
        TestUser {
            username: "new.hire",
            base_role: None,
            roles: &[],
            permissions: &[],
        }
    }

    /// Every fixture account.
    pub fn all() -> Vec<TestUser> {
        vec![
            Self::admin(),
            Self::manager(),
            Self::employee(),
            Self::accountant(),
            Self::warehouse(),
            Self::patient(),
            Self::unassigned(),
        ]
    }
}
