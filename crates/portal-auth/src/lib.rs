// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-auth
//!
//! Talks to the authentication backend and owns the signed-in session.
//!
//! - [`AuthClient`]: the backend seam (login, logout, profile, refresh)
//! - [`HttpAuthClient`]: `reqwest` implementation against the REST backend
//! - [`SessionManager`]: hydrates from the [`SessionStore`](portal_store::SessionStore),
//!   runs login/logout/refresh and publishes [`AuthContext`](portal_core::AuthContext)
//!   snapshots to subscribers
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use portal_auth::{AuthClientConfig, Credentials, HttpAuthClient, SessionManager};
//! use portal_store::{MemoryStorage, SessionStore};
//!
//! let client = HttpAuthClient::new(AuthClientConfig::new("https://clinic.example/api"))?;
//! let store = SessionStore::new(Arc::new(MemoryStorage::new()));
//! let manager = SessionManager::new(store, Arc::new(client));
//!
//! manager.start().await;
//! let session = manager.login(Credentials::new("dr.kim", "secret")).await?;
//! println!("home: {}", session.home_path());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod client;
pub mod config;
pub mod http;
pub mod manager;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{AuthClient, Credentials, LoginResponse};
pub use config::AuthClientConfig;
pub use http::HttpAuthClient;
pub use manager::SessionManager;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
