//! # waddle-realtime
//!
//! Real-time connection hub for Waddle.
//!
//! - A single coordinating task owns the registry of connected clients
//!   and serves register, unregister, and broadcast requests
//! - Broadcast never blocks: a client whose outbound buffer is full is evicted
//! - Direct delivery to one identity applies backpressure to its caller only
//! - Each connection is served by a reader pump and a writer pump
//!
//! The hub is transport-agnostic: it drives any `Stream` of [`Inbound`]
//! frames and any `Sink<String>`. It trusts the identity it is given;
//! authentication happens before [`Hub::attach`] is called.

pub mod connection;
pub mod hub;
pub mod message;
pub mod metrics;

pub use connection::{ClientHandle, ClientState, InboundObserver, LoggingObserver, PumpExit};
pub use hub::Hub;
pub use message::{Inbound, ServerEvent};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
