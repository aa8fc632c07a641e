// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route table.
//!
//! Binds path patterns to an access kind. A pattern is either an exact path
//! (`/login`) or a prefix ending in `*` (`/admin/*`). A prefix pattern ending
//! in `/*` also matches the bare prefix, so `/admin/*` matches `/admin`.
//! The longest matching pattern wins; an exact pattern beats a prefix of the
//! same length. Unmatched paths require authentication only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::AuthContext;
use crate::guard::{AuthRedirect, GuardDecision, GuardRequirement, GuardState, Redirect, RouteGuard};
use crate::role::BaseRole;
use crate::router::{self, LOGIN_PATH, UNAUTHORIZED_PATH};

// =============================================================================
// RouteAccess / RouteRule
// =============================================================================

/// Access kind of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum RouteAccess {
    /// Renders for everyone.
    Public,
    /// Renders only without a session; signed-in users go home.
    PublicOnly,
    /// Guarded by a requirement.
    Protected(GuardRequirement),
}

impl RouteAccess {
    /// Returns the access kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteAccess::Public => "public",
            RouteAccess::PublicOnly => "public_only",
            RouteAccess::Protected(_) => "protected",
        }
    }
}

impl fmt::Display for RouteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteAccess::Protected(req) => write!(f, "protected({req})"),
            other => f.write_str(other.kind()),
        }
    }
}

/// A path pattern and its access kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path pattern.
    pub pattern: String,
    /// Access kind.
    #[serde(flatten)]
    pub access: RouteAccess,
}

impl RouteRule {
    /// Creates a rule.
    pub fn new(pattern: impl Into<String>, access: RouteAccess) -> Self {
        Self {
            pattern: pattern.into(),
            access,
        }
    }

    /// Creates a public rule.
    pub fn public(pattern: impl Into<String>) -> Self {
        Self::new(pattern, RouteAccess::Public)
    }

    /// Creates a public-only rule.
    pub fn public_only(pattern: impl Into<String>) -> Self {
        Self::new(pattern, RouteAccess::PublicOnly)
    }

    /// Creates a protected rule.
    pub fn protected(pattern: impl Into<String>, requirement: GuardRequirement) -> Self {
        Self::new(pattern, RouteAccess::Protected(requirement))
    }

    /// Returns `true` if `pattern` is a well-formed route pattern.
    pub fn is_valid_pattern(pattern: &str) -> bool {
        if !pattern.starts_with('/') {
            return false;
        }
        match pattern.find('*') {
            Some(idx) => idx == pattern.len() - 1,
            None => true,
        }
    }

    /// Returns the match specificity for `path`, or `None` if it does not match.
    fn specificity(&self, path: &str) -> Option<(usize, bool)> {
        match self.pattern.strip_suffix('*') {
            Some(prefix) => {
                let bare = prefix.strip_suffix('/').filter(|b| !b.is_empty());
                if path.starts_with(prefix) || bare == Some(path) {
                    Some((prefix.len(), false))
                } else {
                    None
                }
            }
            None => (self.pattern == path).then_some((self.pattern.len(), true)),
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// What the shell does after a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Navigation {
    /// Render the requested view.
    Render,
    /// Session still loading; show a placeholder.
    Wait,
    /// Navigate elsewhere.
    Redirect(Redirect),
}

/// Outcome of resolving a path against the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResolution {
    /// Requested path without query or fragment.
    pub path: String,
    /// Matching pattern, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Access kind that applied.
    pub access: String,
    /// Guard state for protected routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardState>,
    /// Navigation to perform.
    pub navigation: Navigation,
}

impl From<GuardDecision> for Navigation {
    fn from(decision: GuardDecision) -> Self {
        match (decision.state, decision.redirect) {
            (GuardState::Checking, _) => Navigation::Wait,
            (_, Some(redirect)) => Navigation::Redirect(redirect),
            (_, None) => Navigation::Render,
        }
    }
}

// =============================================================================
// RouteTable
// =============================================================================

/// Ordered set of route rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from rules.
    pub fn from_rules(rules: impl IntoIterator<Item = RouteRule>) -> Self {
        let mut table = Self::new();
        for rule in rules {
            table.add(rule);
        }
        table
    }

    /// Adds a rule, replacing any rule with the same pattern.
    pub fn add(&mut self, rule: RouteRule) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.pattern == rule.pattern) {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
    }

    /// Returns the rules in insertion order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the most specific rule matching `path`.
    pub fn match_path(&self, path: &str) -> Option<&RouteRule> {
        let path = router::strip_query(path);
        self.rules
            .iter()
            .filter_map(|rule| rule.specificity(path).map(|s| (s, rule)))
            .max_by_key(|(s, _)| *s)
            .map(|(_, rule)| rule)
    }

    /// Resolves a navigation to `path`.
    pub fn resolve(&self, guard: &RouteGuard, ctx: &AuthContext, path: &str) -> RouteResolution {
        let bare = router::strip_query(path).to_string();
        let rule = self.match_path(&bare);
        let pattern = rule.map(|r| r.pattern.clone());
        let default_access = RouteAccess::Protected(GuardRequirement::new());
        let access = rule.map(|r| &r.access).unwrap_or(&default_access);

        let (guard_state, navigation) = match access {
            RouteAccess::Public => (None, Navigation::Render),
            RouteAccess::PublicOnly => {
                let return_to = return_to_param(path);
                match AuthRedirect::evaluate_with_return_to(ctx, return_to.as_deref()) {
                    Some(redirect) => (None, Navigation::Redirect(redirect)),
                    None => (None, Navigation::Render),
                }
            }
            RouteAccess::Protected(requirement) => {
                let decision = guard.evaluate(ctx, requirement, &bare);
                (Some(decision.state), decision.into())
            }
        };

        RouteResolution {
            path: bare,
            pattern,
            access: access.kind().to_string(),
            guard: guard_state,
            navigation,
        }
    }

    /// The clinic portal's dashboards.
    ///
    /// Each staff dashboard is bound to its base role; feature areas further
    /// require permissions. `/patient` is the fallback layout and only needs
    /// a session.
    pub fn default_portal() -> Self {
        let staff = |pattern: &str, role: BaseRole| {
            RouteRule::protected(pattern, GuardRequirement::new().base_role(role))
        };

        Self::from_rules([
            RouteRule::public_only(LOGIN_PATH),
            RouteRule::public(UNAUTHORIZED_PATH),
            staff("/admin/*", BaseRole::Admin),
            staff("/manager/*", BaseRole::Manager),
            staff("/employee/*", BaseRole::Employee),
            staff("/accountant/*", BaseRole::Accountant),
            staff("/warehouse/*", BaseRole::Warehouse),
            RouteRule::protected("/patient/*", GuardRequirement::new()),
            RouteRule::protected(
                "/admin/employees/*",
                GuardRequirement::new()
                    .base_role(BaseRole::Admin)
                    .any_permission(["VIEW_EMPLOYEE"]),
            ),
            RouteRule::protected(
                "/employee/patients/*",
                GuardRequirement::new()
                    .base_role(BaseRole::Employee)
                    .any_permission(["VIEW_PATIENT"]),
            ),
            RouteRule::protected(
                "/employee/appointments/*",
                GuardRequirement::new()
                    .base_role(BaseRole::Employee)
                    .any_permission(["VIEW_APPOINTMENT", "VIEW_PATIENT"]),
            ),
            RouteRule::protected(
                "/accountant/invoices/*",
                GuardRequirement::new()
                    .base_role(BaseRole::Accountant)
                    .any_permission(["VIEW_INVOICE", "CREATE_INVOICE"]),
            ),
            RouteRule::protected(
                "/warehouse/exports/*",
                GuardRequirement::new()
                    .base_role(BaseRole::Warehouse)
                    .all_permissions(["VIEW_WAREHOUSE", "EXPORT_WAREHOUSE"]),
            ),
        ])
    }
}

fn return_to_param(location: &str) -> Option<String> {
    let query = location.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == router::RETURN_TO_PARAM)
        .map(|(_, value)| value.into_owned())
}

// =============================================================================
// Tests
// =============================================================================
