// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission identifiers and permission sets.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Permission
// =============================================================================

/// An opaque capability identifier issued by the backend (e.g. `VIEW_EMPLOYEE`).
///
/// Permissions are compared by exact membership; there is no hierarchy and no
/// wildcard matching. Surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Creates a permission from its identifier.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// Returns the permission identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Permission {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// Permissions granted to one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    /// No permissions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a permission set from identifiers. Empty identifiers are dropped.
    pub fn from_permissions<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self {
            permissions: permissions
                .into_iter()
                .map(Into::into)
                .filter(|p: &Permission| !p.is_empty())
                .collect(),
        }
    }

    /// Grants `permission`; blank identifiers are ignored.
    pub fn add(&mut self, permission: impl Into<Permission>) {
        let permission = permission.into();
        if !permission.is_empty() {
            self.permissions.insert(permission);
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission.trim())
    }

    /// Every listed permission is held. Vacuously true for an empty list.
    pub fn contains_all<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        permissions.iter().all(|p| self.contains(p.as_ref()))
    }

    /// At least one listed permission is held. False for an empty list.
    pub fn contains_any<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        permissions.iter().any(|p| self.contains(p.as_ref()))
    }

    /// Number of distinct permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Whether nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Permissions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Returns the identifiers in sorted order.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut names: Vec<String> = self.permissions.iter().map(|p| p.to_string()).collect();
        names.sort();
        names
    }
}

impl<P: Into<Permission>> FromIterator<P> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::from_permissions(iter)
    }
}

// =============================================================================
// Tests
// =============================================================================
