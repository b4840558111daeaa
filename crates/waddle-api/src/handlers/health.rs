//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse, StatusResponse};
use crate::state::AppState;

async fn database_status(state: &AppState) -> &'static str {
    match state.db.health_check().await {
        Ok(true) => "connected",
        _ => "unreachable",
    }
}

/// GET /
pub async fn root(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        api: "Waddle API is running".to_string(),
        db: database_status(&state).await.to_string(),
    })
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = database_status(&state).await;
    let status = if database == "connected" { "ok" } else { "degraded" };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        ws_clients: state.hub.client_count().await,
        sessions: state.sessions.session_count(),
        realtime: state.hub.metrics().snapshot(),
    }))
}
