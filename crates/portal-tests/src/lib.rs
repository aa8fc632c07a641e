// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Clinic Portal Integration Tests
//!
//! Integration tests and shared test utilities for the portal crates.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Users, profiles and signed tokens
//!   - `mocks`: Scriptable auth client and broken storage
//!   - `harness`: Mock REST backend on an ephemeral port plus a temp directory
//!   - `assertions`: Assertions on auth snapshots and navigations
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p portal-tests
//! cargo test -p portal-tests --test integration_guard
//! cargo test -p portal-tests --test integration_session
//! cargo test -p portal-tests --test integration_http
//! cargo test -p portal-tests --test integration_config
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use portal_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let harness = TestHarness::start().await;
//!     let runtime = harness.runtime();
//!     runtime.manager().login(Users::admin_credentials()).await.unwrap();
//!     runtime.open("/admin/employees").assert_render();
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
}
