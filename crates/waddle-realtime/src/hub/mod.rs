//! The connection hub.
//!
//! A [`Hub`] is a cheap, cloneable handle to a coordinating task that
//! exclusively owns the registry of connected clients. Registration,
//! unregistration, and broadcast are requests sent to that task over
//! three single-slot channels: FIFO within each channel, unordered
//! across them. Lookups (`send_to`, `is_connected`) read the registry
//! directly under a shared lock.

mod coordinator;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, Stream, StreamExt};
use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use waddle_core::config::RealtimeConfig;
use waddle_core::error::AppError;
use waddle_core::types::{ConnectionId, Identity};

use crate::connection::{
    ClientHandle, ClientState, InboundObserver, Lifecycle, LoggingObserver, PumpExit, read_pump,
    write_pump,
};
use crate::message::Inbound;
use crate::metrics::RealtimeMetrics;

use self::coordinator::{Coordinator, Registry, Unregistration};

/// Handle to the connection hub.
#[derive(Clone)]
pub struct Hub {
    register_tx: mpsc::Sender<ClientHandle>,
    unregister_tx: mpsc::Sender<Unregistration>,
    broadcast_tx: mpsc::Sender<String>,
    registry: Registry,
    metrics: Arc<RealtimeMetrics>,
    observer: Arc<dyn InboundObserver>,
    outbound_buffer: usize,
    write_timeout: Duration,
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("outbound_buffer", &self.outbound_buffer)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

impl Hub {
    /// Spawns the coordinating task with inbound frames logged.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: &RealtimeConfig) -> Self {
        Self::with_observer(config, Arc::new(LoggingObserver))
    }

    /// Spawns the coordinating task, handing inbound frames to `observer`.
    pub fn with_observer(config: &RealtimeConfig, observer: Arc<dyn InboundObserver>) -> Self {
        let (register_tx, register_rx) = mpsc::channel(1);
        let (unregister_tx, unregister_rx) = mpsc::channel(1);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(1);
        let registry: Registry = Arc::new(RwLock::new(HashMap::new()));
        let metrics = Arc::new(RealtimeMetrics::new());

        let coordinator = Coordinator {
            registry: registry.clone(),
            metrics: metrics.clone(),
            register_rx,
            unregister_rx,
            broadcast_rx,
        };
        tokio::spawn(coordinator.run());

        info!(
            outbound_buffer = config.outbound_buffer_size,
            write_timeout_secs = config.write_timeout_seconds,
            "Connection hub initialized"
        );

        Self {
            register_tx,
            unregister_tx,
            broadcast_tx,
            registry,
            metrics,
            observer,
            outbound_buffer: config.outbound_buffer_size,
            write_timeout: config.write_timeout(),
        }
    }

    /// Hands `client` to the coordinating loop, replacing any entry for
    /// the same identity.
    pub async fn register(&self, client: ClientHandle) -> Result<(), AppError> {
        self.register_tx
            .send(client)
            .await
            .map_err(|_| AppError::service_unavailable("connection hub is not running"))
    }

    /// Removes `client` if it is still the registered connection for its identity.
    pub async fn unregister(&self, client: &ClientHandle) -> Result<(), AppError> {
        self.unregister_tx
            .send(Unregistration {
                identity: client.identity.clone(),
                id: client.id,
            })
            .await
            .map_err(|_| AppError::service_unavailable("connection hub is not running"))
    }

    /// Queues `message` for every connected client.
    ///
    /// Waits only until the loop accepts the request. Clients whose buffer
    /// is full are evicted rather than waited on.
    pub async fn broadcast(&self, message: impl Into<String>) -> Result<(), AppError> {
        self.broadcast_tx
            .send(message.into())
            .await
            .map_err(|_| AppError::service_unavailable("connection hub is not running"))
    }

    /// Queues `message` for one identity, waiting for buffer space if needed.
    ///
    /// Only the caller waits; the coordinating loop is never blocked.
    /// Returns `false` if the identity is not connected, or if its
    /// connection is closed (for example evicted by a broadcast) before
    /// the message could be queued.
    pub async fn send_to(&self, identity: &Identity, message: impl Into<String>) -> bool {
        let client = {
            let registry = self.registry.read().await;
            registry.get(identity).cloned()
        };

        let Some(client) = client else {
            return false;
        };

        let sent = tokio::select! {
            biased;
            _ = client.closed.cancelled() => false,
            sent = client.sender.send(message.into()) => sent.is_ok(),
        };
        if sent {
            self.metrics.direct_delivered();
        }
        sent
    }

    /// Whether `identity` has a registered connection.
    pub async fn is_connected(&self, identity: &Identity) -> bool {
        self.registry.read().await.contains_key(identity)
    }

    /// The connection currently registered for `identity`.
    pub async fn connection_id(&self, identity: &Identity) -> Option<ConnectionId> {
        self.registry.read().await.get(identity).map(|client| client.id)
    }

    /// Number of registered connections.
    pub async fn client_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Hub counters.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }

    /// Registers an authenticated connection and serves it until it ends.
    ///
    /// Runs the reader pump on the current task and the writer pump on a
    /// spawned one. Whichever stops first ends the connection, after which
    /// the client is unregistered.
    pub async fn attach<S, E, K>(
        &self,
        identity: Identity,
        stream: S,
        sink: K,
    ) -> Result<PumpExit, AppError>
    where
        S: Stream<Item = Result<Inbound, E>> + Unpin,
        E: std::fmt::Display,
        K: Sink<String> + Unpin + Send + 'static,
        K::Error: std::fmt::Display,
    {
        let (client, outbound) = ClientHandle::new(identity.clone(), self.outbound_buffer);
        let mut lifecycle = Lifecycle::new(identity.clone(), client.id);

        if let Err(e) = self.register(client.clone()).await {
            lifecycle.advance(ClientState::Closed)?;
            return Err(e);
        }
        lifecycle.advance(ClientState::Registered)?;
        info!(identity = %identity, conn_id = %client.id, "Connection established");

        // Only the registry may keep the channel open.
        let id = client.id;
        let closed = client.closed.clone();
        drop(client);
        let metrics = self.metrics.clone();
        let stream = stream.inspect(move |_| metrics.frame_received());

        let mut writer = tokio::spawn(write_pump(
            outbound,
            sink,
            self.write_timeout,
            closed.clone(),
        ));
        lifecycle.advance(ClientState::Active)?;

        let exit = tokio::select! {
            exit = read_pump(stream, &identity, self.observer.as_ref()) => {
                // The writer closes the sink; each of its steps is bounded
                // by the write deadline.
                closed.cancel();
                let _ = (&mut writer).await;
                exit
            }
            joined = &mut writer => joined.unwrap_or(PumpExit::WriteFailed),
        };
        closed.cancel();

        lifecycle.advance(ClientState::Unregistering)?;
        if let Some(err) = exit.into_error() {
            warn!(identity = %identity, conn_id = %id, error = %err, "Connection failed");
        }

        let unregistered = self
            .unregister_tx
            .send(Unregistration {
                identity: identity.clone(),
                id,
            })
            .await;
        lifecycle.advance(ClientState::Closed)?;
        info!(identity = %identity, conn_id = %id, exit = ?exit, "Connection closed");

        unregistered
            .map(|_| exit)
            .map_err(|_| AppError::service_unavailable("connection hub is not running"))
    }
}
