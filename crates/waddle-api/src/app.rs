//! Application builder: wires router, middleware, and state into an Axum
//! app and serves it.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use waddle_core::error::AppError;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serves the application on `listener` until `shutdown` resolves.
///
/// After the signal, in-flight requests get `server.shutdown_grace_seconds`
/// to finish; anything still open after that is dropped.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let app = build_app(state);

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Waddle server listening");
    }

    let (signalled_tx, mut signalled_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown signal received, draining connections");
            let _ = signalled_tx.send(true);
        })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|e| AppError::internal(format!("Server error: {e}")));
        }
        _ = signalled_rx.wait_for(|signalled| *signalled) => {}
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.map_err(|e| AppError::internal(format!("Server error: {e}"))),
        Err(_) => {
            warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed, dropping open connections"
            );
            Ok(())
        }
    }
}
