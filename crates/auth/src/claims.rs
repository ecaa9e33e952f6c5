use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nestegg_core::OwnerId;

use crate::token::TokenError;

/// Session token claims (transport-agnostic).
///
/// This is the minimal set of claims the tracker expects once a token has
/// been decoded/verified by whatever transport layer is in use. Timestamps
/// are unix seconds, matching the JWT registered-claim convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the owner this session is for.
    pub sub: OwnerId,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiration, unix seconds.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(sub: OwnerId, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// Deterministically validate session claims.
///
/// Note: this validates the *claims* only. Signature verification/decoding
/// lives in [`crate::token`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
