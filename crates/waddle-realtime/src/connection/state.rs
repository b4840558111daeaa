//! Client lifecycle state machine.

use std::fmt;

use tracing::debug;

use waddle_core::error::AppError;
use waddle_core::types::{ConnectionId, Identity};

/// Where a client is in its lifecycle.
///
/// `Connecting → Registered → Active → Unregistering → Closed`. Every way
/// out of `Active` (explicit unregister, eviction, read or write failure)
/// goes through `Unregistering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Transport upgraded, not yet in the registry.
    Connecting,
    /// Accepted by the hub.
    Registered,
    /// Pumps running.
    Active,
    /// Being removed from the registry.
    Unregistering,
    /// Terminal.
    Closed,
}

impl ClientState {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: ClientState) -> bool {
        use ClientState::*;
        matches!(
            (self, next),
            (Connecting, Registered)
                | (Connecting, Closed)
                | (Registered, Active)
                | (Registered, Unregistering)
                | (Active, Unregistering)
                | (Unregistering, Closed)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        self == ClientState::Closed
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Registered => "registered",
            Self::Active => "active",
            Self::Unregistering => "unregistering",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Tracks the state of one connection.
#[derive(Debug)]
pub struct Lifecycle {
    identity: Identity,
    id: ConnectionId,
    state: ClientState,
}

impl Lifecycle {
    /// Starts in `Connecting`.
    pub fn new(identity: Identity, id: ConnectionId) -> Self {
        Self {
            identity,
            id,
            state: ClientState::Connecting,
        }
    }

    /// Current state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Moves to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: ClientState) -> Result<(), AppError> {
        if !self.state.can_transition_to(next) {
            return Err(AppError::internal(format!(
                "illegal client transition {} -> {next}",
                self.state
            )));
        }
        debug!(
            identity = %self.identity,
            conn_id = %self.id,
            from = %self.state,
            to = %next,
            "Client state changed"
        );
        self.state = next;
        Ok(())
    }
}
