//! JWT claims structure shared by access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waddle_core::types::{Identity, TokenId};

/// Claims payload embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity the token was issued to.
    pub sub: Identity,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id. Two tokens minted in the same second still differ.
    pub jti: TokenId,
    /// Access or refresh.
    pub typ: TokenKind,
}

/// Distinguishes access tokens from refresh tokens.
///
/// Each kind is also signed with its own secret, so the claim is a second
/// line of separation rather than the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token for API and streaming access.
    Access,
    /// Long-lived token exchangeable for a new access token.
    Refresh,
}

impl Claims {
    /// Returns the subject identity.
    pub fn identity(&self) -> &Identity {
        &self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let claims = Claims {
            sub: Identity::new("user_1"),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(15)).timestamp(),
            jti: TokenId::new(),
            typ: TokenKind::Access,
        };

        assert!(!claims.is_expired_at(now));
        assert!(!claims.is_expired_at(now + Duration::minutes(14)));
        assert!(claims.is_expired_at(now + Duration::minutes(15)));
    }
}
