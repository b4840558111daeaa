//! Auth handlers: register, login, refresh, logout.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;
use validator::Validate;

use waddle_core::error::AppError;
use waddle_core::types::Identity;
use waddle_entity::user::CreateUser;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{AccessTokenResponse, ApiResponse, AuthResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Hashes `password` off the async worker threads.
pub(crate) async fn hash_password(state: &AppState, password: String) -> Result<String, AppError> {
    let hasher = state.passwords;
    tokio::task::spawn_blocking(move || hasher.hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
}

/// Verifies `password` against `hash` off the async worker threads.
pub(crate) async fn verify_password(
    state: &AppState,
    password: String,
    hash: String,
) -> Result<bool, AppError> {
    let hasher = state.passwords;
    tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    req.validate()?;

    let password_hash = hash_password(&state, req.password).await?;
    let user = state
        .users
        .create(&CreateUser {
            id: Identity::from_email(&req.email),
            name: req.name,
            email: req.email,
            password_hash,
            online: req.online,
            files: req.files,
        })
        .await?;

    let tokens = state.sessions.start_session(&user.id)?;
    info!(identity = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthResponse::new(tokens, user))),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    req.validate()?;

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !verify_password(&state, req.password, user.password_hash.clone()).await? {
        return Err(AppError::unauthorized("Invalid password").into());
    }

    let tokens = state.sessions.start_session(&user.id)?;
    info!(identity = %user.id, "User logged in");

    Ok(Json(ApiResponse::ok(AuthResponse::new(tokens, user))))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, ApiError> {
    req.validate()?;

    let access_token = state.sessions.exchange_refresh(&req.refresh_token)?;
    Ok(Json(ApiResponse::ok(AccessTokenResponse { access_token })))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<ApiResponse<MessageResponse>> {
    state.sessions.revoke_session(&auth.identity);
    info!(identity = %auth.identity, "User logged out");

    Json(ApiResponse::ok(MessageResponse::new("Logged out successfully")))
}
