// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types shared across the portal crates.
//!
//! Authorization denial is deliberately absent from this module: a denied
//! navigation is a [`GuardState`](crate::guard::GuardState), never an error.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for storage backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// AuthError
// =============================================================================

/// Errors raised by the session manager and the authentication collaborator.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The collaborator rejected the credentials.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Message surfaced to the caller of `login`.
        message: String,
        /// HTTP status returned by the collaborator, if any.
        status: Option<u16>,
    },

    /// Persisted session data was corrupt, expired or rejected on validation.
    #[error("Session hydration failed: {message}")]
    SessionHydration {
        /// Error message.
        message: String,
    },

    /// The persistence backend could not be used.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Error message.
        message: String,
    },

    /// The collaborator could not be reached.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The collaborator answered with a body this client cannot use.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },

    /// The operation requires a signed-in session.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl AuthError {
    /// Creates an authentication failure without a status code.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
            status: None,
        }
    }

    /// Creates an authentication failure carrying the collaborator's status.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates a hydration failure.
    pub fn hydration(message: impl Into<String>) -> Self {
        Self::SessionHydration {
            message: message.into(),
        }
    }

    /// Creates a storage failure.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Creates a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns the error type name for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::SessionHydration { .. } => "session_hydration",
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::Transport { .. } => "transport",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::NotAuthenticated => "not_authenticated",
        }
    }

    /// Returns the message to show to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationFailed { message, .. } => message.clone(),
            Self::SessionHydration { .. } | Self::NotAuthenticated => {
                "Your session has ended. Please sign in again.".to_string()
            }
            Self::StorageUnavailable { .. } => "Local session storage is unavailable.".to_string(),
            Self::Transport { .. } => "Unable to reach the authentication service.".to_string(),
            Self::InvalidResponse { .. } => {
                "The authentication service returned an unexpected response.".to_string()
            }
        }
    }

    /// Returns `true` if the error means the stored session can no longer be trusted.
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::SessionHydration { .. } | Self::NotAuthenticated
        )
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        Self::storage(err.to_string())
    }
}

// =============================================================================
// StorageError
// =============================================================================

/// Errors raised by storage backends.
///
/// The session store never propagates these; they are logged and treated as
/// if no session existed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error at '{path}': {source}")]
    Io {
        /// Path of the backing file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be (de)serialized.
    #[error("Storage serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// The backend cannot be used in this context.
    #[error("Storage backend unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },
}

impl StorageError {
    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns the error type name for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Serialization { .. } => "serialization",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_failed_message() {
        let err = AuthError::rejected(401, "Invalid username or password");
        assert_eq!(err.to_string(), "Authentication failed: Invalid username or password");
        assert_eq!(err.user_message(), "Invalid username or password");
        assert!(err.invalidates_session());
    }

    #[test]
    fn test_transport_does_not_invalidate_session() {
        let err = AuthError::transport("connection refused");
        assert_eq!(err.error_type(), "transport");
        assert!(!err.invalidates_session());
    }

    #[test]
    fn test_storage_error_converts() {
        let err: AuthError = StorageError::unavailable("detached").into();
        assert!(matches!(err, AuthError::StorageUnavailable { .. }));
    }
}
