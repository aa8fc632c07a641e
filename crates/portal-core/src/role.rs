// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Roles and base roles.
//!
//! A session carries a set of [`Role`]s used for access checks plus one
//! designated [`BaseRole`] that selects the user's landing layout.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

const ROLE_PREFIX: &str = "ROLE_";

// =============================================================================
// Role
// =============================================================================

/// An opaque role identifier (e.g. `ROLE_ADMIN`, `MANAGER`).
///
/// Roles are canonicalized on construction: trimmed, upper-cased, and stripped
/// of the Spring-style `ROLE_` prefix. `ROLE_ADMIN`, `admin` and `Admin` are
/// therefore the same role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Creates a canonical role from any spelling.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(canonical_role(name.as_ref()))
    }

    /// Returns the canonical role name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the canonical name is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn canonical_role(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    match upper.strip_prefix(ROLE_PREFIX) {
        Some(rest) => rest.to_string(),
        None => upper,
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

// =============================================================================
// RoleSet
// =============================================================================

/// A set of canonical roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: BTreeSet<Role>,
}

impl RoleSet {
    /// Creates an empty role set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a role set from role names in any spelling.
    pub fn from_roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(Into::into)
                .filter(|r: &Role| !r.is_empty())
                .collect(),
        }
    }

    /// Adds a role.
    pub fn add(&mut self, role: impl Into<Role>) {
        let role = role.into();
        if !role.is_empty() {
            self.roles.insert(role);
        }
    }

    /// Returns `true` if the set holds the role (any spelling).
    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains(canonical_role(role).as_str())
    }

    /// Returns `true` if the set holds any of the roles.
    pub fn contains_any<R: AsRef<str>>(&self, roles: &[R]) -> bool {
        roles.iter().any(|r| self.contains(r.as_ref()))
    }

    /// Returns `true` if the set holds all of the roles.
    pub fn contains_all<R: AsRef<str>>(&self, roles: &[R]) -> bool {
        roles.iter().all(|r| self.contains(r.as_ref()))
    }

    /// Returns the number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns an iterator over the roles in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    /// Returns the canonical names in order.
    pub fn to_vec(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.to_string()).collect()
    }
}

impl<R: Into<Role>> FromIterator<R> for RoleSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::from_roles(iter)
    }
}

// =============================================================================
// BaseRole
// =============================================================================

/// Layout-selecting base roles of the clinic portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseRole {
    /// Clinic administrator.
    Admin,
    /// Clinic manager (schedules, renewals, reports).
    Manager,
    /// Dentist, nurse, receptionist and other staff.
    Employee,
    /// Invoices and payments.
    Accountant,
    /// Inventory and FEFO exports.
    Warehouse,
    /// Patient self-service.
    Patient,
}

impl BaseRole {
    /// Returns the base role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseRole::Admin => "admin",
            BaseRole::Manager => "manager",
            BaseRole::Employee => "employee",
            BaseRole::Accountant => "accountant",
            BaseRole::Warehouse => "warehouse",
            BaseRole::Patient => "patient",
        }
    }

    /// Parses a base role, case-insensitively and with or without `ROLE_`.
    pub fn parse(s: &str) -> Option<Self> {
        match canonical_role(s).as_str() {
            "ADMIN" => Some(BaseRole::Admin),
            "MANAGER" => Some(BaseRole::Manager),
            "EMPLOYEE" => Some(BaseRole::Employee),
            "ACCOUNTANT" => Some(BaseRole::Accountant),
            "WAREHOUSE" => Some(BaseRole::Warehouse),
            "PATIENT" => Some(BaseRole::Patient),
            _ => None,
        }
    }

    /// Returns all base roles.
    pub fn all() -> &'static [BaseRole] {
        &[
            BaseRole::Admin,
            BaseRole::Manager,
            BaseRole::Employee,
            BaseRole::Accountant,
            BaseRole::Warehouse,
            BaseRole::Patient,
        ]
    }

    /// Returns `true` for staff layouts (everyone but patients).
    pub fn is_staff(&self) -> bool {
        !matches!(self, BaseRole::Patient)
    }
}

impl fmt::Display for BaseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
