// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Base role → landing path mapping.
//!
//! The mapping is total: every [`BaseRole`] has exactly one layout, and a
//! missing or unrecognized base role falls back to [`DEFAULT_HOME_PATH`].

use crate::role::BaseRole;

/// Path of the sign-in page.
pub const LOGIN_PATH: &str = "/login";

/// Path of the access-denied page.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Landing path for sessions without a recognized base role.
pub const DEFAULT_HOME_PATH: &str = "/patient";

/// Query parameter carrying the originally requested path on login redirects.
pub const RETURN_TO_PARAM: &str = "redirect";

impl BaseRole {
    /// Returns the landing path of this base role's layout.
    pub fn home_path(&self) -> &'static str {
        match self {
            BaseRole::Admin => "/admin",
            BaseRole::Manager => "/manager",
            BaseRole::Employee => "/employee",
            BaseRole::Accountant => "/accountant",
            BaseRole::Warehouse => "/warehouse",
            BaseRole::Patient => "/patient",
        }
    }
}

/// Returns the landing path for a raw base role string.
///
/// ```
/// use portal_core::home_path;
///
/// assert_eq!(home_path(Some("admin")), "/admin");
/// assert_eq!(home_path(Some("ROLE_ACCOUNTANT")), "/accountant");
/// assert_eq!(home_path(Some("dentist")), "/patient");
/// assert_eq!(home_path(None), "/patient");
/// ```
pub fn home_path(base_role: Option<&str>) -> &'static str {
    base_role
        .and_then(BaseRole::parse)
        .map(|role| role.home_path())
        .unwrap_or(DEFAULT_HOME_PATH)
}

/// Returns `true` if `path` is the login page or the unauthorized page.
pub fn is_auth_page(path: &str) -> bool {
    let path = strip_query(path);
    path == LOGIN_PATH || path == UNAUTHORIZED_PATH
}

/// Returns the path component of a location, without query or fragment.
pub fn strip_query(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_base_role_has_a_distinct_home() {
        let mut paths: Vec<&str> = BaseRole::all().iter().map(|r| r.home_path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), BaseRole::all().len());
    }

    #[test]
    fn test_home_path_mapping() {
        assert_eq!(home_path(Some("admin")), "/admin");
        assert_eq!(home_path(Some("manager")), "/manager");
        assert_eq!(home_path(Some("employee")), "/employee");
        assert_eq!(home_path(Some("warehouse")), "/warehouse");
        assert_eq!(home_path(Some("patient")), "/patient");
    }

    #[test]
    fn test_home_path_default() {
        assert_eq!(home_path(None), DEFAULT_HOME_PATH);
        assert_eq!(home_path(Some("")), DEFAULT_HOME_PATH);
        assert_eq!(home_path(Some("superuser")), DEFAULT_HOME_PATH);
    }

    #[test]
    fn test_is_auth_page() {
        assert!(is_auth_page("/login"));
        assert!(is_auth_page("/login?redirect=%2Fadmin"));
        assert!(is_auth_page("/unauthorized"));
        assert!(!is_auth_page("/admin"));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("/admin/users?page=2"), "/admin/users");
        assert_eq!(strip_query("/patient#top"), "/patient");
        assert_eq!(strip_query("/warehouse"), "/warehouse");
    }
}
