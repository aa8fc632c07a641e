// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! REST implementation of [`AuthClient`].
//!
//! Endpoints (paths configurable):
//!
//! | Operation      | Request                                  |
//! |----------------|------------------------------------------|
//! | `login`        | `POST /auth/login` `{username, password}` |
//! | `logout`       | `POST /auth/logout`, bearer token         |
//! | `current_user` | `GET /auth/me`, bearer token              |
//! | `refresh`      | `POST /auth/refresh` `{refreshToken}`     |
//!
//! Error bodies are read as `{"message": ..}` or `{"error": {"message": ..}}`.
//! Requests are not retried.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use portal_core::{AuthError, AuthResult, UserProfile};

use crate::client::{AuthClient, Credentials, LoginResponse};
use crate::config::AuthClientConfig;

const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// HTTP authentication client.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    http: Client,
    config: AuthClientConfig,
}

impl HttpAuthClient {
    /// Creates a client.
    pub fn new(config: AuthClientConfig) -> AuthResult<Self> {
        url::Url::parse(&config.base_url).map_err(|e| {
            AuthError::transport(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AuthError::transport(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AuthClientConfig {
        &self.config
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(REQUEST_ID_HEADER, Uuid::now_v7().to_string())
    }

    async fn send(&self, operation: &'static str, builder: RequestBuilder) -> AuthResult<Response> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        debug!(operation, status = response.status().as_u16(), "Auth backend responded");
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn login(&self, credentials: &Credentials) -> AuthResult<LoginResponse> {
        let url = self.config.endpoint(&self.config.login_path);
        let response = self.send("login", self.http.post(url).json(credentials)).await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response, "Invalid username or password").await;
            return Err(status_error(status, message));
        }
        Self::json(response).await
    }

    async fn logout(&self, token: &str) -> AuthResult<()> {
        let url = self.config.endpoint(&self.config.logout_path);
        let response = self.send("logout", self.http.post(url).bearer_auth(token)).await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let message = error_message(response, "Logout failed").await;
        Err(status_error(status, message))
    }

    async fn current_user(&self, token: &str) -> AuthResult<UserProfile> {
        let url = self.config.endpoint(&self.config.me_path);
        let response = self.send("current_user", self.http.get(url).bearer_auth(token)).await?;

        match response.status() {
            s if s.is_success() => Self::json(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let message = error_message(response, "Session is no longer valid").await;
                Err(AuthError::hydration(message))
            }
            s => {
                let message = error_message(response, "Profile lookup failed").await;
                Err(status_error(s, message))
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<LoginResponse> {
        let url = self.config.endpoint(&self.config.refresh_path);
        let body = serde_json::json!({ "refreshToken": refresh_token });
        let response = self.send("refresh", self.http.post(url).json(&body)).await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response, "Token refresh failed").await;
            return Err(status_error(status, message));
        }
        Self::json(response).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

// =============================================================================
// Error mapping
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Flat { message: String },
    Nested { error: NestedError },
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: String,
}

/// Extracts the backend's error message, or `fallback` if the body has none.
async fn error_message(response: Response, fallback: &str) -> String {
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to read error body");
            return fallback.to_string();
        }
    };
    parse_error_message(&body).unwrap_or_else(|| fallback.to_string())
}

fn parse_error_message(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<ErrorBody>(body).ok()? {
        ErrorBody::Flat { message } => message,
        ErrorBody::Nested { error } => error.message,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Only an explicit refusal counts as a rejection. Server errors and other
/// statuses are transport failures and leave the session alone.
fn status_error(status: StatusCode, message: String) -> AuthError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AuthError::rejected(status.as_u16(), message)
        }
        _ => AuthError::transport(format!("{status}: {message}")),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        AuthError::transport(format!("connection failed: {e}"))
    } else {
        AuthError::transport(e.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        assert_eq!(
            parse_error_message(r#"{"message": "Invalid username or password"}"#).as_deref(),
            Some("Invalid username or password")
        );
        assert_eq!(
            parse_error_message(r#"{"error": {"message": "Account locked", "code": 423}}"#).as_deref(),
            Some("Account locked")
        );
        assert_eq!(parse_error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(parse_error_message(r#"{"message": "  "}"#), None);
    }

    #[test]
    fn test_status_error_separates_refusals_from_outages() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = status_error(status, "Invalid username or password".into());
            assert!(err.invalidates_session(), "{status}");
            assert!(matches!(err, AuthError::AuthenticationFailed { status: Some(_), .. }));
        }

        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            let err = status_error(status, "Token refresh failed".into());
            assert!(!err.invalidates_session(), "{status}");
            assert!(matches!(err, AuthError::Transport { .. }));
        }
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = HttpAuthClient::new(AuthClientConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, AuthError::Transport { .. }));
    }

    #[test]
    fn test_new_client() {
        let client = HttpAuthClient::new(AuthClientConfig::new("http://127.0.0.1:9/api")).unwrap();
        assert_eq!(client.name(), "http");
        assert_eq!(client.config().me_path, "/auth/me");
    }
}
