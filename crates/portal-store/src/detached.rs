// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Backend for contexts without client storage.
//!
//! The analogue of rendering on the server: there is nowhere to keep a
//! session, so reads find nothing and writes are dropped.

use portal_core::StorageResult;

use crate::traits::StorageBackend;

/// A backend that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedStorage;

impl DetachedStorage {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl StorageBackend for DetachedStorage {
    fn name(&self) -> &'static str {
        "detached"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_stores_nothing() {
        let storage = DetachedStorage::new();
        assert!(!storage.is_available());
        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
    }
}
