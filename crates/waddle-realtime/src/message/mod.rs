//! Frame and event types carried over streaming connections.

pub mod types;

pub use types::{Inbound, ServerEvent};
