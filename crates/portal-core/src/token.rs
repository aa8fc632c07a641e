// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unverified access token inspection.
//!
//! The portal never verifies token signatures; the backend does. The client
//! only reads the `exp` claim to know when a persisted session has gone stale.
//! Opaque (non-JWT) tokens simply yield no claims.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims the portal reads from a backend-issued JWT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, typically the username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Returns the expiration time.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decodes the claims of a JWT without checking its signature or expiry.
///
/// Returns `None` for anything that is not a well-formed JWT.
pub fn decode_unverified(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::trace!(error = %e, "Token is not a decodable JWT");
            None
        }
    }
}

/// Returns the expiry encoded in a JWT, if any.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    decode_unverified(token).and_then(|claims| claims.expires_at())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(claims: &TokenClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_reads_exp_without_secret() {
        let exp = Utc::now().timestamp() + 3600;
        let token = sign(&TokenClaims {
            sub: Some("dr.kim".to_string()),
            exp: Some(exp),
            iat: None,
        });

        let claims = decode_unverified(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("dr.kim"));
        assert_eq!(token_expiry(&token).map(|t| t.timestamp()), Some(exp));
    }

    #[test]
    fn test_decode_accepts_expired_token() {
        let exp = Utc::now().timestamp() - 3600;
        let token = sign(&TokenClaims {
            sub: None,
            exp: Some(exp),
            iat: None,
        });

        assert_eq!(token_expiry(&token).map(|t| t.timestamp()), Some(exp));
    }

    #[test]
    fn test_opaque_token_has_no_claims() {
        assert!(decode_unverified("opaque-session-token").is_none());
        assert!(token_expiry("a.b.c").is_none());
    }
}
