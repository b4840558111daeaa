//! WebSocket upgrade handler.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use futures::{SinkExt, StreamExt, future};
use serde::Deserialize;
use tracing::{error, warn};

use waddle_core::error::AppError;
use waddle_core::types::Identity;
use waddle_realtime::{Hub, Inbound};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Access token. Browsers cannot set headers on the upgrade request.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token must be the caller's live access token; nothing is upgraded
/// otherwise.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .or_else(|| bearer.map(|TypedHeader(Authorization(b))| b.token().to_owned()))
        .ok_or_else(|| AppError::unauthorized("Missing access token"))?;
    let AuthUser { identity } = AuthUser::authorize(&state, &token)?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| serve_socket(hub, identity, socket)))
}

async fn serve_socket(hub: Hub, identity: Identity, socket: WebSocket) {
    let (sink, stream) = socket.split();
    let sink = sink.with(|text: String| {
        future::ready(Ok::<_, axum::Error>(Message::Text(text.into())))
    });
    let stream = stream.map(|frame| frame.map(inbound_from));

    match hub.attach(identity.clone(), stream, sink).await {
        Ok(exit) => {
            if let Some(err) = exit.into_error() {
                warn!(identity = %identity, error = %err, "WebSocket ended with a transport error");
            }
        }
        Err(e) => error!(identity = %identity, error = %e, "WebSocket could not be served"),
    }
}

fn inbound_from(message: Message) -> Inbound {
    match message {
        Message::Text(text) => Inbound::Text(text.as_str().to_owned()),
        Message::Binary(bytes) => Inbound::Binary(bytes),
        Message::Ping(_) | Message::Pong(_) => Inbound::Control,
        Message::Close(_) => Inbound::Close,
    }
}
