//! Signed session tokens for remote-mode identities.
//!
//! A session is an HS256 JWT whose subject is the identity id. It is kept
//! client-side in the key-value store and checked on every session restore.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::types::RecordId;

/// Claims carried by every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Identity id.
    pub sub: RecordId,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret; the remote API key doubles as the signing secret.
    pub secret: String,
    pub expiry_hours: i64,
}

pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 168;

impl SessionConfig {
    pub fn new(secret: impl Into<String>, expiry_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }
}

pub fn issue_session_token(
    identity_id: &str,
    email: &str,
    config: &SessionConfig,
) -> CoreResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: identity_id.to_string(),
        email: email.to_string(),
        exp: now + config.expiry_hours * 3600,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| CoreError::BackendFailure(format!("Failed to sign session: {e}")))
}

/// Check signature and expiry. Any failure reads as an invalid session.
pub fn validate_session_token(token: &str, config: &SessionConfig) -> CoreResult<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| CoreError::Unauthenticated(format!("Invalid session: {e}")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config(secret: &str) -> SessionConfig {
        SessionConfig::new(secret, DEFAULT_SESSION_EXPIRY_HOURS)
    }

    #[test]
    fn issued_token_validates() {
        let cfg = config("a-signing-secret-of-decent-length");
        let token = issue_session_token("id-1", "ana@example.com", &cfg).unwrap();
        let claims = validate_session_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, "id-1");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.exp - claims.iat, 168 * 3600);
    }

    #[test]
    fn expired_token_rejected() {
        let cfg = config("a-signing-secret-of-decent-length");
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "id-1".into(),
            email: "ana@example.com".into(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap();
        assert_matches!(validate_session_token(&token, &cfg), Err(CoreError::Unauthenticated(_)));
    }

    #[test]
    fn foreign_secret_rejected() {
        let token = issue_session_token("id-1", "a@b.c", &config("secret-alpha-0000")).unwrap();
        assert!(validate_session_token(&token, &config("secret-bravo-0000")).is_err());
    }
}
