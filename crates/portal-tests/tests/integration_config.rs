// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Config files on disk feeding a runtime.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use portal_bin::PortalRuntime;
use portal_config::{ConfigError, ConfigLoader, LogLevel, PortalConfig};
use portal_core::{BaseRole, RouteAccess};
use portal_store::StorageBackendKind;
use portal_tests::common::temp_test_dir;
use portal_tests::prelude::*;

const CLINIC_YAML: &str = r#"
api:
  base_url: ${CLINIC_API:http://localhost:8080/api}
  timeout: 3s
storage:
  backend: file
  path: state/session.json
routes:
  rules:
    - pattern: /manager/*
      access: protected
      roles: [MANAGER, ADMIN]
    - pattern: /help
      access: public
logging:
  level: info
"#;

fn isolated() -> ConfigLoader {
    ConfigLoader::new().with_env(Vec::<(String, String)>::new())
}

fn write_config(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = temp_test_dir("portal-config");
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_yaml_file_with_placeholders_and_overrides() {
    let (dir, path) = write_config("portal.yaml", CLINIC_YAML);
    let loader = isolated().with_env([
        ("CLINIC_API", "https://clinic.example/api"),
        ("PORTAL_LOG_LEVEL", "trace"),
    ]);

    let config = loader.load(&path).unwrap();

    assert_eq!(config.api.base_url, "https://clinic.example/api");
    assert_eq!(config.api.timeout, Duration::from_secs(3));
    assert_eq!(config.storage.backend, StorageBackendKind::File);
    assert_eq!(config.storage.path, dir.path().join("state/session.json"));
    assert_eq!(config.logging.level, LogLevel::Trace);
}

#[test]
fn test_placeholder_default_applies() {
    let (_dir, path) = write_config("portal.yaml", CLINIC_YAML);
    let config = isolated().load(&path).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8080/api");
}

#[test]
fn test_storage_path_override_is_resolved_against_config_dir() {
    let (dir, path) = write_config("portal.yaml", CLINIC_YAML);
    let config = isolated()
        .with_env([("PORTAL_STORAGE_PATH", "other/tab.json")])
        .load(&path)
        .unwrap();
    assert_eq!(config.storage.path, dir.path().join("other/tab.json"));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = temp_test_dir("portal-config");
    let path = dir.path().join("portal.yaml");

    assert!(matches!(isolated().load(&path), Err(ConfigError::FileNotFound { .. })));
    let config = isolated().load_or_default(&path).unwrap();
    assert_eq!(config, PortalConfig::default());
    assert_eq!(config.storage.backend, StorageBackendKind::File);
}

#[test]
fn test_invalid_files_are_rejected() {
    let (_dir, bad_url) = write_config("portal.yaml", "api:\n  base_url: ftp://clinic.example\n");
    assert!(matches!(
        isolated().load(&bad_url),
        Err(ConfigError::Validation { ref field, .. }) if field == "api.base_url"
    ));

    let duplicate = r#"
routes:
  rules:
    - pattern: /x
      access: public
    - pattern: /x
      access: public_only
"#;
    let (_dir, dup) = write_config("portal.yaml", duplicate);
    assert!(matches!(isolated().load(&dup), Err(ConfigError::Validation { .. })));

    let (_dir, pattern) = write_config("portal.yaml", "routes:\n  rules:\n    - pattern: admin/*\n      access: public\n");
    assert!(matches!(isolated().load(&pattern), Err(ConfigError::Validation { .. })));
}

// =============================================================================
// Route table from config
// =============================================================================

#[test]
fn test_rules_merge_over_default_portal() {
    let (_dir, path) = write_config("portal.yaml", CLINIC_YAML);
    let config = isolated().load(&path).unwrap();
    let table = config.routes.route_table();

    let manager_rule = table
        .rules()
        .iter()
        .find(|r| r.pattern == "/manager/*")
        .unwrap();
    match &manager_rule.access {
        RouteAccess::Protected(req) => {
            assert_eq!(req.roles, vec!["MANAGER".to_string(), "ADMIN".to_string()]);
            assert_eq!(req.base_role, None);
        }
        other => panic!("unexpected access {other:?}"),
    }
    assert!(table.rules().iter().any(|r| r.pattern == "/admin/*"));
}

#[test]
fn test_replace_defaults_keeps_only_listed_rules() {
    let yaml = r#"
routes:
  replace_defaults: true
  rules:
    - pattern: /clinic/*
      access: protected
      base_role: employee
"#;
    let config = isolated().load_from_str(yaml, portal_config::ConfigFormat::Yaml).unwrap();
    let table = config.routes.route_table();

    assert_eq!(table.len(), 1);
    match &table.rules()[0].access {
        RouteAccess::Protected(req) => assert_eq!(req.base_role, Some(BaseRole::Employee)),
        other => panic!("unexpected access {other:?}"),
    }
}

// =============================================================================
// Runtime
// =============================================================================

#[tokio::test]
async fn test_runtime_applies_configured_rules() {
    let (_dir, path) = write_config("portal.yaml", CLINIC_YAML);
    let config = isolated()
        .with_env([("PORTAL_STORAGE_BACKEND", "memory")])
        .load(&path)
        .unwrap();

    let client = Arc::new(MockAuthClient::new().with_users(Users::all()));
    let runtime = PortalRuntime::with_client(config, client).unwrap();
    runtime.start(false).await.assert_anonymous();
    runtime.open("/help").assert_render();

    runtime.manager().login(Users::admin().credentials()).await.unwrap();
    runtime.open("/manager/reports").assert_render();
    runtime.open("/help").assert_render();
}

#[tokio::test]
async fn test_runtime_custom_pages() {
    let yaml = r#"
storage:
  backend: memory
routes:
  login_path: /sign-in
  unauthorized_path: /denied
"#;
    let config = isolated().load_from_str(yaml, portal_config::ConfigFormat::Yaml).unwrap();
    let client = Arc::new(MockAuthClient::new().with_users(Users::all()));
    let runtime = PortalRuntime::with_client(config, client).unwrap();
    runtime.start(false).await;

    runtime.open("/admin").assert_redirect_to("/sign-in");
    runtime.manager().login(Users::patient().credentials()).await.unwrap();
    runtime.open("/admin").assert_redirect_to("/denied");
}
