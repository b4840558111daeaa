//! Hub metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters updated by the hub and its pumps.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    connections_active: AtomicU64,
    messages_broadcast: AtomicU64,
    direct_messages: AtomicU64,
    frames_received: AtomicU64,
    evictions: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client was added to the registry.
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the current registry size.
    pub fn set_active(&self, active: usize) {
        self.connections_active.store(active as u64, Ordering::Relaxed);
    }

    /// A broadcast message was queued for `recipients` clients.
    pub fn broadcast_delivered(&self, recipients: usize) {
        self.messages_broadcast
            .fetch_add(recipients as u64, Ordering::Relaxed);
    }

    /// A direct message was queued.
    pub fn direct_delivered(&self) {
        self.direct_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// A frame arrived from a client.
    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A slow consumer was evicted.
    pub fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_broadcast: self.messages_broadcast.load(Ordering::Relaxed),
            direct_messages: self.direct_messages.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Clients ever registered.
    pub connections_opened: u64,
    /// Clients currently registered.
    pub connections_active: u64,
    /// Broadcast messages queued, counted per recipient.
    pub messages_broadcast: u64,
    /// Direct messages queued.
    pub direct_messages: u64,
    /// Frames received from clients.
    pub frames_received: u64,
    /// Clients evicted for a full outbound buffer.
    pub evictions: u64,
}
