//! The coordinating loop: sole mutator of the client registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use waddle_core::types::{ConnectionId, Identity};

use crate::connection::ClientHandle;
use crate::metrics::RealtimeMetrics;

/// Connected clients keyed by identity. At most one entry per identity.
pub(crate) type Registry = Arc<RwLock<HashMap<Identity, ClientHandle>>>;

/// Request to remove a specific connection.
#[derive(Debug)]
pub(crate) struct Unregistration {
    pub identity: Identity,
    pub id: ConnectionId,
}

/// Receiving ends of the three request channels plus shared state.
pub(crate) struct Coordinator {
    pub registry: Registry,
    pub metrics: Arc<RealtimeMetrics>,
    pub register_rx: mpsc::Receiver<ClientHandle>,
    pub unregister_rx: mpsc::Receiver<Unregistration>,
    pub broadcast_rx: mpsc::Receiver<String>,
}

impl Coordinator {
    /// Serves requests until every `Hub` handle has been dropped.
    pub async fn run(mut self) {
        info!("Connection hub started");
        loop {
            tokio::select! {
                Some(client) = self.register_rx.recv() => self.register(client).await,
                Some(request) = self.unregister_rx.recv() => self.unregister(request).await,
                Some(message) = self.broadcast_rx.recv() => self.broadcast(message).await,
                else => break,
            }
        }

        // Closing every client lets the writer pumps finish.
        for (_, client) in self.registry.write().await.drain() {
            client.close();
        }
        self.metrics.set_active(0);
        info!("Connection hub stopped");
    }

    async fn register(&self, client: ClientHandle) {
        let mut registry = self.registry.write().await;
        let identity = client.identity.clone();
        let id = client.id;

        if let Some(replaced) = registry.insert(identity.clone(), client)
            && replaced.id != id
        {
            replaced.close();
            info!(
                identity = %identity,
                replaced_conn = %replaced.id,
                conn_id = %id,
                "Replaced existing connection"
            );
        } else {
            debug!(identity = %identity, conn_id = %id, "Client registered");
        }

        self.metrics.connection_opened();
        self.metrics.set_active(registry.len());
    }

    async fn unregister(&self, request: Unregistration) {
        let mut registry = self.registry.write().await;
        let current = registry
            .get(&request.identity)
            .is_some_and(|client| client.id == request.id);

        if current {
            if let Some(client) = registry.remove(&request.identity) {
                client.close();
            }
            self.metrics.set_active(registry.len());
            debug!(identity = %request.identity, conn_id = %request.id, "Client unregistered");
        }
    }

    async fn broadcast(&self, message: String) {
        let mut registry = self.registry.write().await;
        let mut delivered = 0;
        let mut dropped = Vec::new();

        for (identity, client) in registry.iter() {
            if client.is_closed() {
                dropped.push(identity.clone());
                continue;
            }
            match client.sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        identity = %identity,
                        conn_id = %client.id,
                        "Outbound buffer overflow, evicting client"
                    );
                    self.metrics.eviction();
                    dropped.push(identity.clone());
                }
                Err(TrySendError::Closed(_)) => dropped.push(identity.clone()),
            }
        }

        for identity in &dropped {
            if let Some(client) = registry.remove(identity) {
                client.close();
            }
        }

        self.metrics.broadcast_delivered(delivered);
        self.metrics.set_active(registry.len());
    }
}
