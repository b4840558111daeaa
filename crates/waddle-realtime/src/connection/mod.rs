//! Per-connection types: the client handle, its lifecycle, and its pumps.

pub mod handle;
pub mod observer;
pub mod pump;
pub mod state;

pub use handle::ClientHandle;
pub use observer::{InboundObserver, LoggingObserver};
pub use pump::{PumpExit, read_pump, write_pump};
pub use state::{ClientState, Lifecycle};
