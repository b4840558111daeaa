//! User handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::info;
use validator::Validate;

use waddle_core::error::AppError;
use waddle_core::types::{Identity, PageResponse};
use waddle_entity::user::UpdateUser;

use crate::dto::request::{ChangePasswordRequest, UpdateUserRequest};
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::handlers::auth::{hash_password, verify_password};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<UserResponse>>>, ApiError> {
    let page = state.users.find_all(params.into_page_request()).await?;
    Ok(Json(ApiResponse::ok(page.map(UserResponse::from))))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .users
        .find_by_id(&Identity::new(id))
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users
///
/// Updates the caller. The identity stays the one derived at registration.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    req.validate()?;

    let user = state
        .users
        .update(&UpdateUser {
            id: auth.identity,
            name: req.name,
            email: req.email,
            online: req.online,
            files: req.files,
        })
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = Identity::new(id);
    if !state.users.delete(&id).await? {
        return Err(AppError::not_found("User not found").into());
    }

    state.sessions.revoke_session(&id);
    info!(identity = %id, deleted_by = %auth.identity, "User deleted");

    Ok(Json(ApiResponse::ok(MessageResponse::new("User deleted"))))
}

/// PUT /api/users/password
///
/// Ends the caller's session on success.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;

    let user = state
        .users
        .find_by_id(&auth.identity)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !verify_password(&state, req.current_password, user.password_hash).await? {
        return Err(AppError::unauthorized("Current password is incorrect").into());
    }

    let password_hash = hash_password(&state, req.new_password).await?;
    state
        .users
        .update_password(&auth.identity, &password_hash)
        .await?;
    state.sessions.revoke_session(&auth.identity);

    info!(identity = %auth.identity, "Password changed; session revoked");

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed, please log in again",
    ))))
}
