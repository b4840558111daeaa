//! Sink for frames read from clients.

use std::fmt;

use tracing::{debug, info};

use waddle_core::types::Identity;

use crate::message::Inbound;

/// Receives every non-close frame read from a client.
pub trait InboundObserver: Send + Sync + fmt::Debug {
    /// Called once per frame, in arrival order for a given connection.
    fn on_frame(&self, identity: &Identity, frame: &Inbound);
}

/// Logs inbound frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl InboundObserver for LoggingObserver {
    fn on_frame(&self, identity: &Identity, frame: &Inbound) {
        match frame {
            Inbound::Text(text) => info!(identity = %identity, text = %text, "Received message"),
            Inbound::Binary(data) => {
                info!(identity = %identity, bytes = data.len(), "Received binary message")
            }
            Inbound::Control | Inbound::Close => {
                debug!(identity = %identity, "Received control frame")
            }
        }
    }
}
