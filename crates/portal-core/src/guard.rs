// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route authorization guard.
//!
//! [`RouteGuard::evaluate`] decides whether a protected view renders, and if
//! not, where the user is sent. Rules apply in order:
//!
//! 1. session still loading: [`GuardState::Checking`], no redirect
//! 2. not authenticated: redirect to the login page with the requested path
//! 3. required base role mismatch: redirect to the unauthorized page
//! 4. required roles, none held: redirect to the unauthorized page
//! 5. required permissions (all or any) not met: redirect to the unauthorized page
//! 6. otherwise [`GuardState::Allowed`]
//!
//! Denial is a state, never an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::context::AuthContext;
use crate::role::BaseRole;
use crate::router::{self, LOGIN_PATH, RETURN_TO_PARAM, UNAUTHORIZED_PATH};

// =============================================================================
// GuardRequirement
// =============================================================================

/// Declarative access requirement attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardRequirement {
    /// Base role the session must carry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_role: Option<BaseRole>,

    /// Roles of which the session must hold at least one.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Permissions checked according to `require_all`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    /// Require every permission instead of any one.
    pub require_all: bool,
}

impl GuardRequirement {
    /// Creates a requirement satisfied by any authenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a base role.
    pub fn base_role(mut self, base_role: BaseRole) -> Self {
        self.base_role = Some(base_role);
        self
    }

    /// Requires at least one of the roles.
    pub fn any_role<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the required permissions, keeping the current `require_all` mode.
    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Requires at least one of the permissions.
    pub fn any_permission<I, S>(self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions(permissions).require_all(false)
    }

    /// Requires every one of the permissions.
    pub fn all_permissions<I, S>(self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions(permissions).require_all(true)
    }

    /// Sets the permission mode.
    pub fn require_all(mut self, require_all: bool) -> Self {
        self.require_all = require_all;
        self
    }

    /// Returns `true` if only authentication is required.
    pub fn is_authentication_only(&self) -> bool {
        self.base_role.is_none() && self.roles.is_empty() && self.permissions.is_empty()
    }
}

impl fmt::Display for GuardRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_authentication_only() {
            return f.write_str("authenticated");
        }
        let mut parts = Vec::new();
        if let Some(base_role) = self.base_role {
            parts.push(format!("base_role={base_role}"));
        }
        if !self.roles.is_empty() {
            parts.push(format!("any_role=[{}]", self.roles.join(",")));
        }
        if !self.permissions.is_empty() {
            let mode = if self.require_all { "all" } else { "any" };
            parts.push(format!("{mode}_permission=[{}]", self.permissions.join(",")));
        }
        f.write_str(&parts.join(" "))
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Guard outcome for a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Session still loading; render a placeholder.
    Checking,
    /// Render the protected view.
    Allowed,
    /// No session; go to the login page.
    DeniedUnauthenticated,
    /// Session lacks the required access; go to the unauthorized page.
    DeniedForbidden,
}

impl GuardState {
    /// Returns the state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardState::Checking => "checking",
            GuardState::Allowed => "allowed",
            GuardState::DeniedUnauthenticated => "denied_unauthenticated",
            GuardState::DeniedForbidden => "denied_forbidden",
        }
    }

    /// Returns `true` if access was denied.
    pub fn is_denied(&self) -> bool {
        matches!(
            self,
            GuardState::DeniedUnauthenticated | GuardState::DeniedForbidden
        )
    }
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client-side navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Target path.
    pub path: String,
    /// Originally requested path, carried as `?redirect=`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    /// Replace the current history entry instead of pushing one.
    pub replace: bool,
}

impl Redirect {
    /// Creates a history-replacing redirect.
    pub fn replace(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            return_to: None,
            replace: true,
        }
    }

    /// Attaches the requested path.
    pub fn with_return_to(mut self, return_to: impl Into<String>) -> Self {
        self.return_to = Some(return_to.into());
        self
    }

    /// Returns the full location including the query string.
    pub fn location(&self) -> String {
        match &self.return_to {
            Some(return_to) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(RETURN_TO_PARAM, return_to)
                    .finish();
                format!("{}?{}", self.path, query)
            }
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Guard decision: a state plus the redirect to perform, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardDecision {
    /// Outcome.
    pub state: GuardState,
    /// Navigation to perform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirect>,
}

impl GuardDecision {
    fn checking() -> Self {
        Self {
            state: GuardState::Checking,
            redirect: None,
        }
    }

    fn allowed() -> Self {
        Self {
            state: GuardState::Allowed,
            redirect: None,
        }
    }

    fn unauthenticated(login_path: &str, requested_path: &str) -> Self {
        Self {
            state: GuardState::DeniedUnauthenticated,
            redirect: Some(Redirect::replace(login_path).with_return_to(requested_path)),
        }
    }

    fn forbidden(unauthorized_path: &str) -> Self {
        Self {
            state: GuardState::DeniedForbidden,
            redirect: Some(Redirect::replace(unauthorized_path)),
        }
    }

    /// Returns `true` if the view renders.
    pub fn is_allowed(&self) -> bool {
        self.state == GuardState::Allowed
    }
}

// =============================================================================
// RouteGuard
// =============================================================================

/// Evaluates [`GuardRequirement`]s against an [`AuthContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    unauthorized_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    /// Creates a guard using the standard login and unauthorized pages.
    pub fn new() -> Self {
        Self {
            login_path: LOGIN_PATH.to_string(),
            unauthorized_path: UNAUTHORIZED_PATH.to_string(),
        }
    }

    /// Overrides the login page path.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Overrides the unauthorized page path.
    pub fn with_unauthorized_path(mut self, path: impl Into<String>) -> Self {
        self.unauthorized_path = path.into();
        self
    }

    /// Returns the login page path.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns the unauthorized page path.
    pub fn unauthorized_path(&self) -> &str {
        &self.unauthorized_path
    }

    /// Decides the outcome of navigating to `requested_path`.
    pub fn evaluate(
        &self,
        ctx: &AuthContext,
        requirement: &GuardRequirement,
        requested_path: &str,
    ) -> GuardDecision {
        let decision = self.decide(ctx, requirement, requested_path);
        tracing::debug!(
            path = requested_path,
            state = %decision.state,
            load_state = %ctx.state(),
            requirement = %requirement,
            "Guard evaluated"
        );
        decision
    }

    fn decide(
        &self,
        ctx: &AuthContext,
        requirement: &GuardRequirement,
        requested_path: &str,
    ) -> GuardDecision {
        if ctx.is_loading() {
            return GuardDecision::checking();
        }

        if !ctx.is_authenticated() {
            return GuardDecision::unauthenticated(&self.login_path, requested_path);
        }

        if let Some(required) = requirement.base_role {
            if ctx.base_role() != Some(required) {
                return GuardDecision::forbidden(&self.unauthorized_path);
            }
        }

        if !requirement.roles.is_empty() && !ctx.has_any_role(requirement.roles.as_slice()) {
            return GuardDecision::forbidden(&self.unauthorized_path);
        }

        if !requirement.permissions.is_empty() {
            let granted = if requirement.require_all {
                ctx.has_all_permissions(requirement.permissions.as_slice())
            } else {
                ctx.has_any_permission(requirement.permissions.as_slice())
            };
            if !granted {
                return GuardDecision::forbidden(&self.unauthorized_path);
            }
        }

        GuardDecision::allowed()
    }
}

// =============================================================================
// AuthRedirect
// =============================================================================

/// Sends authenticated users away from public-only pages such as the login page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthRedirect;

impl AuthRedirect {
    /// Returns the redirect to the user's home, or `None` to render the page.
    ///
    /// Nothing happens while loading or when no session is in place.
    pub fn evaluate(ctx: &AuthContext) -> Option<Redirect> {
        if ctx.is_loading() || !ctx.is_authenticated() {
            return None;
        }
        Some(Redirect::replace(ctx.home_path()))
    }

    /// Like [`AuthRedirect::evaluate`], honoring a `?redirect=` target.
    ///
    /// The target is only followed when it is a local path other than the
    /// login or unauthorized pages.
    pub fn evaluate_with_return_to(ctx: &AuthContext, return_to: Option<&str>) -> Option<Redirect> {
        let home = Self::evaluate(ctx)?;
        match return_to {
            Some(target) if is_local_path(target) && !router::is_auth_page(target) => {
                Some(Redirect::replace(target))
            }
            _ => Some(home),
        }
    }
}

/// Browsers read `\` as `/` and strip tabs and newlines, so either can turn
/// `/x` into `//host`.
fn is_local_path(path: &str) -> bool {
    if !path.starts_with('/') || path.starts_with("//") {
        return false;
    }
    if path.chars().any(|c| c == '\\' || c.is_control()) {
        return false;
    }
    let Ok(base) = Url::parse("http://portal.invalid/") else {
        return false;
    };
    base.join(path).is_ok_and(|target| target.origin() == base.origin())
}

// =============================================================================
// Tests
// =============================================================================
