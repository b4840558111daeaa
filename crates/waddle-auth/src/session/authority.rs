//! The session authority: issues, stores, validates, and revokes paired
//! access/refresh tokens.
//!
//! Issuance and storage are separate steps. A token whose signature and
//! expiry check out is only *live* if it is also the token currently on
//! record for its subject; storing a new pair or revoking the session
//! therefore invalidates every earlier token for that identity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use waddle_core::config::AuthConfig;
use waddle_core::error::AppError;
use waddle_core::traits::Clock;
use waddle_core::types::Identity;

use super::store::{SessionRecord, SessionStore};
use crate::error::TokenError;
use crate::jwt::{Claims, JwtDecoder, JwtEncoder, TokenKind};

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

impl From<TokenPair> for SessionRecord {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Process-wide owner of the session map.
#[derive(Debug)]
pub struct SessionAuthority {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    store: SessionStore,
    clock: Arc<dyn Clock>,
}

impl SessionAuthority {
    /// Builds the authority, refusing to start without two distinct secrets.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if config.access_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.access_secret is not set"));
        }
        if config.refresh_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.refresh_secret is not set"));
        }
        if config.access_secret == config.refresh_secret {
            return Err(AppError::configuration(
                "auth.access_secret and auth.refresh_secret must differ",
            ));
        }
        if config.access_ttl_minutes <= 0 || config.refresh_ttl_days <= 0 {
            return Err(AppError::configuration("token lifetimes must be positive"));
        }

        Ok(Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            store: SessionStore::new(),
            clock,
        })
    }

    /// Mints a new pair for `identity`. Nothing is stored.
    pub fn issue_session(&self, identity: &Identity) -> Result<TokenPair, AppError> {
        let now = self.clock.now();
        Ok(TokenPair {
            access_token: self.encoder.encode(identity, TokenKind::Access, now)?,
            refresh_token: self.encoder.encode(identity, TokenKind::Refresh, now)?,
        })
    }

    /// Records `pair` as the only live session for `identity`.
    pub fn store_session(&self, identity: Identity, pair: TokenPair) {
        let replaced = self.store.put(identity.clone(), pair.into()).is_some();
        debug!(identity = %identity, replaced, "Session stored");
    }

    /// Issues and stores a new pair in one step.
    pub fn start_session(&self, identity: &Identity) -> Result<TokenPair, AppError> {
        let pair = self.issue_session(identity)?;
        self.store_session(identity.clone(), pair.clone());
        Ok(pair)
    }

    /// Checks signature, kind, and expiry. Does not check liveness.
    pub fn validate_session(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        self.decoder.decode(token, kind, self.clock.now())
    }

    /// Drops the session for `identity`. Returns whether one existed.
    pub fn revoke_session(&self, identity: &Identity) -> bool {
        let existed = self.store.remove(identity).is_some();
        if existed {
            info!(identity = %identity, "Session revoked");
        }
        existed
    }

    /// Full liveness check for an access token.
    pub fn authorize_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.validate_session(token, TokenKind::Access)?;
        if !self.store.is_current_access(&claims.sub, token) {
            return Err(TokenError::Revoked);
        }
        Ok(claims)
    }

    /// Trades a live refresh token for a new access token.
    ///
    /// The refresh token itself is not renewed; the new access token
    /// replaces the stored one, so the previous access token stops being live.
    pub fn exchange_refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = self.validate_session(refresh_token, TokenKind::Refresh)?;
        if !self.store.is_current_refresh(&claims.sub, refresh_token) {
            return Err(TokenError::Revoked.into());
        }

        let access_token = self
            .encoder
            .encode(&claims.sub, TokenKind::Access, self.clock.now())?;

        // The session may have been replaced or revoked while signing.
        if !self
            .store
            .replace_access(&claims.sub, refresh_token, access_token.clone())
        {
            return Err(TokenError::Revoked.into());
        }

        debug!(identity = %claims.sub, "Access token refreshed");
        Ok(access_token)
    }

    /// Number of identities with a live session.
    pub fn session_count(&self) -> usize {
        self.store.len()
    }
}
