// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! [`MockBackend`] serves the clinic's REST auth endpoints on an ephemeral
//! port, answering from a [`MockAuthClient`]. [`TestHarness`] pairs it with
//! a temp directory so every runtime it builds shares one session file, the
//! way browser tabs share `localStorage`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use portal_auth::{AuthClient, AuthClientConfig, Credentials, HttpAuthClient};
use portal_bin::PortalRuntime;
use portal_config::PortalConfig;
use portal_core::AuthError;
use portal_store::StorageConfig;

use crate::common::fixtures::Users;
use crate::common::mocks::MockAuthClient;
use crate::common::temp_test_dir;

// =============================================================================
// MockBackend
// =============================================================================

#[derive(Clone)]
struct BackendState {
    auth: Arc<MockAuthClient>,
    request_ids: Arc<Mutex<Vec<String>>>,
}

impl BackendState {
    fn track(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().push(id.to_string());
        }
    }
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody {
    refresh_token: String,
}

/// REST auth backend served by axum.
pub struct MockBackend {
    addr: SocketAddr,
    state: BackendState,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Serves `auth` on `127.0.0.1` with an ephemeral port.
    pub async fn start(auth: MockAuthClient) -> Self {
        let state = BackendState {
            auth: Arc::new(auth),
            request_ids: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/me", get(me))
            .route("/api/auth/refresh", post(refresh))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL to configure the client with.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// The auth logic behind the endpoints.
    pub fn auth(&self) -> &MockAuthClient {
        &self.state.auth
    }

    /// `X-Request-ID` values received so far.
    pub fn request_ids(&self) -> Vec<String> {
        self.state.request_ids.lock().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Response {
    state.track(&headers);
    match state
        .auth
        .login(&Credentials::new(body.username, body.password))
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(e),
    }
}

async fn logout(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    state.track(&headers);
    let Some(token) = bearer(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    match state.auth.logout(&token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn me(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    state.track(&headers);
    let Some(token) = bearer(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    match state.auth.current_user(&token).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => error_response(e),
    }
}

async fn refresh(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<RefreshBody>,
) -> Response {
    state.track(&headers);
    match state.auth.refresh(&body.refresh_token).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(e),
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Login errors use the flat body, session errors the nested one.
fn error_response(error: AuthError) -> Response {
    match error {
        AuthError::AuthenticationFailed { message, status } => {
            let status = status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::UNAUTHORIZED);
            (status, Json(serde_json::json!({ "message": message }))).into_response()
        }
        AuthError::SessionHydration { message } => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": { "message": message, "code": 401 } })),
        )
            .into_response(),
        other => (StatusCode::SERVICE_UNAVAILABLE, other.to_string()).into_response(),
    }
}

// =============================================================================
// TestHarness
// =============================================================================

/// Mock backend plus an isolated storage directory.
pub struct TestHarness {
    backend: MockBackend,
    dir: TempDir,
}

impl TestHarness {
    /// Starts a backend knowing every fixture user.
    pub async fn start() -> Self {
        Self::with_auth(MockAuthClient::new().with_users(Users::all())).await
    }

    /// Starts a backend answering from `auth`.
    pub async fn with_auth(auth: MockAuthClient) -> Self {
        Self {
            backend: MockBackend::start(auth).await,
            dir: temp_test_dir("portal-harness"),
        }
    }

    /// The mock backend.
    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }

    /// The session file shared by every runtime.
    pub fn storage_path(&self) -> PathBuf {
        self.dir.path().join("session.json")
    }

    /// Configuration pointing at the backend and the shared session file.
    pub fn config(&self) -> PortalConfig {
        PortalConfig {
            api: AuthClientConfig::new(self.backend.base_url()),
            storage: StorageConfig::file(self.storage_path()),
            ..Default::default()
        }
    }

    /// HTTP client for the backend.
    pub fn client(&self) -> HttpAuthClient {
        HttpAuthClient::new(self.config().api).expect("Failed to build client")
    }

    /// A fresh runtime; each call is a new "tab".
    pub fn runtime(&self) -> PortalRuntime {
        PortalRuntime::new(self.config()).expect("Failed to build runtime")
    }
}
