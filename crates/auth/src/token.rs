//! HS256 session tokens for the single owner.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use nestegg_core::OwnerId;

use crate::claims::{SessionClaims, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidWindow,

    #[error("malformed or badly signed token: {0}")]
    Invalid(String),

    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// A minted session handed back to the caller after password verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Symmetric signing/verification keys for session tokens.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a session token for the owner, valid for `ttl` from `now`.
    pub fn mint(
        &self,
        owner_id: OwnerId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Session, TokenError> {
        let expires_at = now + ttl;
        let claims = SessionClaims::new(owner_id, now, expires_at);
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))?;
        Ok(Session { token, expires_at })
    }

    /// Verify signature and claims, returning the claims when valid.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Signature check here; the time-window check stays in the pure
        // claims validator so it is testable without key material.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret")
    }

    #[test]
    fn mint_then_verify_round_trips_owner() {
        let owner = OwnerId::new();
        let now = Utc::now();
        let session = keys().mint(owner, now, Duration::minutes(30)).unwrap();

        let claims = keys().verify(&session.token, now).unwrap();
        assert_eq!(claims.sub, owner);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let session = keys().mint(OwnerId::new(), now, Duration::minutes(30)).unwrap();
        let err = keys()
            .verify(&session.token, now + Duration::minutes(31))
            .unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let now = Utc::now();
        let session = keys().mint(OwnerId::new(), now, Duration::minutes(30)).unwrap();
        let other = SessionKeys::new(b"different-secret");
        assert!(matches!(
            other.verify(&session.token, now),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            keys().verify("not-a-token", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
    }
}
