// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-core
//!
//! Core types for the clinic portal's authorization gate.
//!
//! This crate owns everything that decides *what a signed-in user may see*,
//! without performing any I/O:
//!
//! - **Role / Permission**: opaque, canonicalized identifiers and their sets
//! - **Session**: the signed-in user's token and cached profile
//! - **Token**: unverified JWT claim decoding (expiry extraction)
//! - **Context**: immutable auth snapshots and the [`LoadState`] machine
//! - **Router**: the total base role → landing path mapping
//! - **Guard**: the render / redirect decision for a protected route
//! - **Routes**: a route table binding path patterns to guard requirements
//!
//! ## Example
//!
//! ```
//! use portal_core::{AuthContext, GuardRequirement, GuardState, RouteGuard, Session, UserProfile};
//!
//! let profile = UserProfile::new("dr.kim", "kim@clinic.example")
//!     .with_roles(["EMPLOYEE"])
//!     .with_permissions(["VIEW_PATIENT"])
//!     .with_base_role("employee");
//! let ctx = AuthContext::authenticated(Session::from_profile("token-123", profile));
//!
//! let requirement = GuardRequirement::new().any_permission(["VIEW_PATIENT", "VIEW_APPOINTMENT"]);
//! let decision = RouteGuard::new().evaluate(&ctx, &requirement, "/employee/patients");
//!
//! assert_eq!(decision.state, GuardState::Allowed);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod context;
pub mod error;
pub mod guard;
pub mod permission;
pub mod role;
pub mod router;
pub mod routes;
pub mod session;
pub mod token;

// =============================================================================
// Re-exports
// =============================================================================

pub use context::{AuthContext, LoadState, Resolution};
pub use error::{AuthError, AuthResult, StorageError, StorageResult};
pub use guard::{AuthRedirect, GuardDecision, GuardRequirement, GuardState, Redirect, RouteGuard};
pub use permission::{Permission, PermissionSet};
pub use role::{BaseRole, Role, RoleSet};
pub use router::{home_path, DEFAULT_HOME_PATH, LOGIN_PATH, RETURN_TO_PARAM, UNAUTHORIZED_PATH};
pub use routes::{Navigation, RouteAccess, RouteResolution, RouteRule, RouteTable};
pub use session::{Session, UserProfile};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
