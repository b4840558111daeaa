//! Inbound frames and outbound server events.

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use waddle_core::error::AppError;
use waddle_core::types::Identity;

/// A frame received from a client, independent of the transport library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Bytes),
    /// Ping or pong control frame.
    Control,
    /// Close frame. Ends the reader pump.
    Close,
}

impl Inbound {
    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(data) => data.len(),
            Self::Control | Self::Close => 0,
        }
    }

    /// Whether the frame carries no payload.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Events pushed from the server to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Message fanned out to every connected client.
    Broadcast {
        /// Identity that published the message.
        from: Identity,
        /// Message body.
        message: String,
        /// Publication time (seconds since epoch).
        sent_at: i64,
    },
    /// Message addressed to a single identity.
    Direct {
        /// Identity that sent the message.
        from: Identity,
        /// Message body.
        message: String,
        /// Send time (seconds since epoch).
        sent_at: i64,
    },
}

impl ServerEvent {
    /// A broadcast event stamped with the current time.
    pub fn broadcast(from: Identity, message: impl Into<String>) -> Self {
        Self::Broadcast {
            from,
            message: message.into(),
            sent_at: Utc::now().timestamp(),
        }
    }

    /// A direct event stamped with the current time.
    pub fn direct(from: Identity, message: impl Into<String>) -> Self {
        Self::Direct {
            from,
            message: message.into(),
            sent_at: Utc::now().timestamp(),
        }
    }

    /// Serializes the event into a text frame.
    pub fn to_text(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_is_tagged() {
        let event = ServerEvent::broadcast(Identity::new("user_1"), "hello");
        let value: serde_json::Value = serde_json::from_str(&event.to_text().unwrap()).unwrap();

        assert_eq!(value["type"], "broadcast");
        assert_eq!(value["from"], "user_1");
        assert_eq!(value["message"], "hello");
    }

    #[test]
    fn test_inbound_len() {
        assert_eq!(Inbound::Text("abc".to_string()).len(), 3);
        assert_eq!(Inbound::Binary(Bytes::from_static(b"ab")).len(), 2);
        assert!(Inbound::Close.is_empty());
    }
}
