//! The registry's view of one connected client.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use waddle_core::types::{ConnectionId, Identity};

/// A registered client: who it is, which connection, and where to queue
/// outbound text frames.
///
/// The hub holds the only long-lived sender. Once the hub lets go of a
/// client it also fires `closed`; senders still holding a clone give up
/// and the writer pump stops without draining what is queued.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    /// Owning identity.
    pub identity: Identity,
    /// Distinguishes this connection from others for the same identity.
    pub id: ConnectionId,
    /// Bounded outbound queue.
    pub sender: mpsc::Sender<String>,
    /// Fired when the connection is replaced, unregistered, or evicted.
    pub closed: CancellationToken,
}

impl ClientHandle {
    /// Creates a handle with an outbound buffer of `capacity` frames,
    /// returning the receiving end for the writer pump.
    pub fn new(identity: Identity, capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = Self {
            identity,
            id: ConnectionId::new(),
            sender,
            closed: CancellationToken::new(),
        };
        (handle, receiver)
    }

    /// Marks the connection closed. Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Whether the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}
