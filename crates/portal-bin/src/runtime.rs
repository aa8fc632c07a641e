// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Portal runtime wiring.
//!
//! Builds the session store, auth client, session manager and route table
//! from a [`PortalConfig`].

use std::sync::Arc;

use tracing::{debug, info};

use portal_auth::{AuthClient, HttpAuthClient, SessionManager};
use portal_config::{ConfigLoader, PortalConfig};
use portal_core::{AuthContext, RouteAccess, RouteGuard, RouteResolution, RouteRule, RouteTable};
use portal_store::{open_backend, SessionStore};

use crate::cli::Cli;
use crate::error::BinResult;

// =============================================================================
// Configuration
// =============================================================================

/// Loads the configuration named on the command line.
///
/// A missing file yields defaults; a present but invalid file is an error.
pub fn load_config(cli: &Cli) -> BinResult<PortalConfig> {
    Ok(ConfigLoader::new().load_or_default(&cli.config)?)
}

// =============================================================================
// PortalRuntime
// =============================================================================

/// The wired components behind every command.
#[derive(Debug)]
pub struct PortalRuntime {
    config: Arc<PortalConfig>,
    manager: SessionManager,
    routes: RouteTable,
    guard: RouteGuard,
}

impl PortalRuntime {
    /// Creates a runtime talking to the configured REST backend.
    pub fn new(config: PortalConfig) -> BinResult<Self> {
        let client = HttpAuthClient::new(config.api.clone())?;
        Self::with_client(config, Arc::new(client))
    }

    /// Creates a runtime with a custom auth client.
    pub fn with_client(config: PortalConfig, client: Arc<dyn AuthClient>) -> BinResult<Self> {
        let backend = open_backend(&config.storage)?;
        let store = SessionStore::with_keys(backend, config.storage.keys.clone());
        let manager = SessionManager::new(store, client);
        let routes = config.routes.route_table();
        let guard = config.routes.guard();

        debug!(
            storage = config.storage.backend.as_str(),
            routes = routes.len(),
            "Runtime initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            manager,
            routes,
            guard,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Returns the session manager.
    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Returns the route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Returns the route guard.
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Hydrates the stored session and, unless `offline`, confirms it with
    /// the backend.
    ///
    /// Offline, a hydrated session stays in the checking state, which the
    /// guard treats as signed in.
    pub async fn start(&self, offline: bool) -> AuthContext {
        if offline {
            self.manager.init();
            return self.manager.snapshot();
        }
        let ctx = self.manager.start().await;
        info!(state = %ctx.state(), user = ctx.username().unwrap_or("-"), "Session resolved");
        ctx
    }

    /// Resolves a navigation against the current snapshot.
    pub fn open(&self, path: &str) -> RouteResolution {
        self.routes
            .resolve(&self.guard, &self.manager.snapshot(), path)
    }

    /// Whether the current user may open pages under `rule`.
    pub fn can_access(&self, rule: &RouteRule) -> bool {
        let ctx = self.manager.snapshot();
        match &rule.access {
            RouteAccess::Public => true,
            RouteAccess::PublicOnly => !ctx.is_authenticated(),
            RouteAccess::Protected(requirement) => {
                let path = rule.pattern.trim_end_matches('*');
                self.guard.evaluate(&ctx, requirement, path).is_allowed()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{Navigation, Session, UserProfile};
    use portal_store::{StorageBackendKind, StorageConfig};

    fn memory_config() -> PortalConfig {
        PortalConfig {
            storage: StorageConfig::memory(),
            ..Default::default()
        }
    }

    fn runtime() -> PortalRuntime {
        PortalRuntime::new(memory_config()).unwrap()
    }

    fn seed(runtime: &PortalRuntime, base_role: &str, permissions: &[&str]) {
        let profile = UserProfile::new("dr.kim", "kim@clinic.example")
            .with_base_role(base_role)
            .with_permissions(permissions.iter().copied());
        runtime
            .manager()
            .store()
            .persist(&Session::from_profile("opaque-token", profile));
    }

    #[tokio::test]
    async fn test_offline_start_without_session() {
        let runtime = runtime();
        let ctx = runtime.start(true).await;

        assert!(!ctx.is_authenticated());
        assert_eq!(runtime.config().storage.backend, StorageBackendKind::Memory);
    }

    #[tokio::test]
    async fn test_open_with_hydrated_session() {
        let runtime = runtime();
        seed(&runtime, "admin", &["VIEW_EMPLOYEE"]);
        runtime.start(true).await;

        assert_eq!(runtime.open("/admin/employees").navigation, Navigation::Render);
        assert!(matches!(
            runtime.open("/manager").navigation,
            Navigation::Redirect(ref r) if r.path == "/unauthorized"
        ));
    }

    #[tokio::test]
    async fn test_can_access() {
        let runtime = runtime();
        seed(&runtime, "employee", &["VIEW_PATIENT"]);
        runtime.start(true).await;

        let rule = |pattern: &str| {
            runtime
                .routes()
                .rules()
                .iter()
                .find(|r| r.pattern == pattern)
                .cloned()
                .unwrap()
        };

        assert!(runtime.can_access(&rule("/employee/patients/*")));
        assert!(!runtime.can_access(&rule("/admin/*")));
        assert!(!runtime.can_access(&rule("/login")));
        assert!(runtime.can_access(&rule("/unauthorized")));
    }
}
