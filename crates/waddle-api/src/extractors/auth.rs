//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header and admits the request only if it is the live access token for
//! its subject.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use waddle_core::error::AppError;
use waddle_core::types::Identity;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Subject of the live access token.
    pub identity: Identity,
}

impl AuthUser {
    /// Checks `token` against the session authority.
    pub fn authorize(state: &AppState, token: &str) -> Result<Self, ApiError> {
        let claims = state.sessions.authorize_access(token)?;
        Ok(Self {
            identity: claims.sub,
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already admitted by `require_auth`.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized("Missing bearer token"))?;

        Self::authorize(state, bearer.token())
    }
}
