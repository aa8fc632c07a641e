// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Storage backend abstraction.
//!
//! Mirrors the browser `localStorage` contract: synchronous string values
//! addressed by string keys. Backends report failures; the
//! [`SessionStore`](crate::SessionStore) decides to swallow them.

use std::fmt::Debug;

use portal_core::StorageResult;

/// A synchronous key/value store for string values.
pub trait StorageBackend: Send + Sync + Debug {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Returns `false` when there is no client context to store into.
    fn is_available(&self) -> bool {
        true
    }

    /// Reads a value.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes a value. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
