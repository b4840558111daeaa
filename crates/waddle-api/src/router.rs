//! Route definitions for the Waddle HTTP API.
//!
//! Open routes cover status, registration, login, refresh, and the
//! WebSocket upgrade (which authorizes its own query token). Everything
//! else sits behind `require_auth`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Build the Axum router with all routes, bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(session_routes())
        .merge(user_routes())
        .merge(message_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes())
        .merge(protected)
        .with_state(state)
}

/// Status, credentials exchange, and streaming upgrade.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/api/health", get(handlers::health::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/ws", get(handlers::ws::ws_handler))
}

fn session_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(handlers::auth::logout))
}

/// User CRUD and password change
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(handlers::user::list_users).put(handlers::user::update_user),
        )
        .route("/api/users/password", put(handlers::user::change_password))
        .route(
            "/api/users/{id}",
            get(handlers::user::get_user).delete(handlers::user::delete_user),
        )
}

/// Server-initiated pushes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/api/broadcast", post(handlers::broadcast::broadcast))
        .route("/api/messages/{id}", post(handlers::broadcast::send_direct))
}
