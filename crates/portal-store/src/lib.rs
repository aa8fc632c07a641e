// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-store
//!
//! Client-local persistence of the signed-in session.
//!
//! The portal keeps two string entries: the access token and the serialized
//! user profile. [`SessionStore`] wraps a [`StorageBackend`] and never fails:
//! backend errors are logged and reported as "nothing stored".
//!
//! Backends:
//!
//! - [`MemoryStorage`]: in-process map
//! - [`FileStorage`]: JSON object file, replaced atomically on write
//! - [`DetachedStorage`]: no client context; reads nothing, writes nothing
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use portal_store::{MemoryStorage, SessionStore};
//!
//! let store = SessionStore::new(Arc::new(MemoryStorage::new()));
//! store.set_token("token-123");
//! assert_eq!(store.get_token().as_deref(), Some("token-123"));
//!
//! store.clear_auth_data();
//! assert!(!store.is_authenticated());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod config;
pub mod detached;
pub mod file;
pub mod memory;
pub mod session_store;
pub mod traits;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{open_backend, StorageBackendKind, StorageConfig, StorageKeys};
pub use detached::DetachedStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use session_store::SessionStore;
pub use traits::StorageBackend;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
