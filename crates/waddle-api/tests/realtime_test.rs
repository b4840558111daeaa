//! Integration tests for the health surface, direct messages, and the
//! WebSocket upgrade over a real listener.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use waddle_core::types::Identity;
use waddle_realtime::Hub;

async fn eventually(hub: &Hub, identity: &Identity, connected: bool) {
    for _ in 0..200 {
        if hub.is_connected(identity).await == connected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{identity} never reached connected={connected}");
}

async fn spawn_server(app: &helpers::TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(waddle_api::serve(
        listener,
        app.state.clone(),
        std::future::pending(),
    ));
    format!("ws://{addr}/ws")
}

#[tokio::test]
async fn test_health_reports_hub_and_sessions() {
    let app = helpers::TestApp::new();
    app.login("user_1");

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["ws_clients"], 0);
    assert_eq!(response.body["data"]["sessions"], 1);
    assert_eq!(response.body["data"]["database"], "unreachable");
    assert_eq!(response.body["data"]["status"], "degraded");
}

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/ws", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/ws?token=garbage", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_authorized_but_not_an_upgrade() {
    let app = helpers::TestApp::new();
    let pair = app.login("user_1");

    let path = format!("/ws?token={}", pair.access_token);
    let response = app.request("GET", &path, None, None).await;

    assert_ne!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_direct_message_to_offline_user() {
    let app = helpers::TestApp::new();
    let pair = app.login("user_1");

    let response = app
        .request(
            "POST",
            "/api/messages/user_2",
            Some(json!({ "message": "anyone?" })),
            Some(&pair.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ws_client_receives_broadcast_and_direct() {
    let app = helpers::TestApp::new();
    let url = spawn_server(&app).await;
    let identity = Identity::new("user_1");
    let listener_pair = app.login("user_1");
    let sender_pair = app.login("user_2");

    let (mut client, _) = connect_async(format!("{url}?token={}", listener_pair.access_token))
        .await
        .expect("upgrade");
    eventually(&app.state.hub, &identity, true).await;

    let response = app
        .request(
            "POST",
            "/api/broadcast",
            Some(json!({ "message": "hello all" })),
            Some(&sender_pair.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let frame = client.next().await.expect("frame").expect("ok frame");
    let Message::Text(text) = frame else {
        panic!("expected text frame, got {frame:?}");
    };
    let event: Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(event["type"], "broadcast");
    assert_eq!(event["from"], "user_2");
    assert_eq!(event["message"], "hello all");

    let response = app
        .request(
            "POST",
            "/api/messages/user_1",
            Some(json!({ "message": "just you" })),
            Some(&sender_pair.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let frame = client.next().await.expect("frame").expect("ok frame");
    let Message::Text(text) = frame else {
        panic!("expected text frame, got {frame:?}");
    };
    let event: Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(event["type"], "direct");
    assert_eq!(event["message"], "just you");

    client.close(None).await.unwrap();
    eventually(&app.state.hub, &identity, false).await;
}

#[tokio::test]
async fn test_ws_rejects_revoked_token() {
    let app = helpers::TestApp::new();
    let url = spawn_server(&app).await;
    let pair = app.login("user_1");
    app.state.sessions.revoke_session(&Identity::new("user_1"));

    let err = connect_async(format!("{url}?token={}", pair.access_token))
        .await
        .expect_err("upgrade must be refused");

    match err {
        WsError::Http(response) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_ws_inbound_frames_are_counted() {
    let app = helpers::TestApp::new();
    let url = spawn_server(&app).await;
    let identity = Identity::new("user_1");
    let pair = app.login("user_1");

    let (mut client, _) = connect_async(format!("{url}?token={}", pair.access_token))
        .await
        .expect("upgrade");
    eventually(&app.state.hub, &identity, true).await;

    client.send(Message::text("ping from client")).await.unwrap();
    client.close(None).await.unwrap();
    eventually(&app.state.hub, &identity, false).await;

    let snapshot = app.state.hub.metrics().snapshot();
    assert!(snapshot.frames_received >= 1);
    assert_eq!(snapshot.connections_active, 0);
}
