//! Server-initiated pushes to connected clients.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use validator::Validate;

use waddle_core::error::AppError;
use waddle_core::types::Identity;
use waddle_realtime::ServerEvent;

use crate::dto::request::MessageRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/broadcast
///
/// Returns once the hub has accepted the message. Delivery to each client
/// happens afterwards.
pub async fn broadcast(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<MessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    req.validate()?;

    let text = ServerEvent::broadcast(auth.identity, req.message).to_text()?;
    state.hub.broadcast(text).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(MessageResponse::new("Broadcast queued"))),
    ))
}

/// POST /api/messages/{id}
pub async fn send_direct(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;

    let text = ServerEvent::direct(auth.identity, req.message).to_text()?;
    if !state.hub.send_to(&Identity::new(id), text).await {
        return Err(AppError::not_found("Recipient is not connected").into());
    }

    Ok(Json(ApiResponse::ok(MessageResponse::new("Message delivered"))))
}
