// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of the authentication backend client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClientConfig {
    /// Base URL of the REST backend (e.g. `https://clinic.example/api`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Login endpoint path.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Logout endpoint path.
    #[serde(default = "default_logout_path")]
    pub logout_path: String,

    /// Current-user endpoint path.
    #[serde(default = "default_me_path")]
    pub me_path: String,

    /// Token refresh endpoint path.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Request timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

fn default_me_path() -> String {
    "/auth/me".to_string()
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    concat!("clinic-portal/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for AuthClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            me_path: default_me_path(),
            refresh_path: default_refresh_path(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl AuthClientConfig {
    /// Creates a configuration for `base_url` with default endpoint paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins the base URL and an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let config = AuthClientConfig::new("https://clinic.example/api/");
        assert_eq!(
            config.endpoint(&config.login_path),
            "https://clinic.example/api/auth/login"
        );
        assert_eq!(config.endpoint("auth/me"), "https://clinic.example/api/auth/me");
    }

    #[test]
    fn test_humantime_timeout() {
        let config: AuthClientConfig =
            serde_json::from_str(r#"{"base_url": "http://x", "timeout": "2s 500ms"}"#).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.me_path, "/auth/me");
    }
}
