//! Real-time WebSocket hub configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each client's outbound message buffer. A broadcast that
    /// finds the buffer full evicts the client.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Deadline for a single frame write, in seconds.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
}

impl RealtimeConfig {
    /// Returns the per-write deadline.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            write_timeout_seconds: default_write_timeout(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_write_timeout() -> u64 {
    10
}
