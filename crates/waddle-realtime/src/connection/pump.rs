//! Reader and writer pumps for one connection.

use std::fmt::Display;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use waddle_core::error::AppError;
use waddle_core::types::Identity;

use super::observer::InboundObserver;
use crate::message::Inbound;

/// Why a pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The peer sent a close frame or the stream ended.
    ClosedByPeer,
    /// Reading from the transport failed.
    ReadFailed,
    /// Writing to the transport failed.
    WriteFailed,
    /// A single write did not finish within the deadline.
    DeadlineExceeded,
    /// The hub closed the connection or dropped its outbound channel.
    ChannelClosed,
}

impl PumpExit {
    /// Whether the exit was caused by a transport fault.
    pub fn is_transport_error(self) -> bool {
        matches!(
            self,
            Self::ReadFailed | Self::WriteFailed | Self::DeadlineExceeded
        )
    }

    /// The transport error this exit represents, if any.
    pub fn into_error(self) -> Option<AppError> {
        if !self.is_transport_error() {
            return None;
        }
        let message = match self {
            Self::ReadFailed => "read from transport failed",
            Self::WriteFailed => "write to transport failed",
            _ => "write to transport timed out",
        };
        Some(AppError::transport(message))
    }
}

/// Forwards frames from `stream` to `observer` until close, end of stream,
/// or the first read error.
pub async fn read_pump<S, E>(
    mut stream: S,
    identity: &Identity,
    observer: &dyn InboundObserver,
) -> PumpExit
where
    S: Stream<Item = Result<Inbound, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Inbound::Close) => return PumpExit::ClosedByPeer,
            Ok(frame) => observer.on_frame(identity, &frame),
            Err(e) => {
                debug!(identity = %identity, error = %e, "Read failed");
                return PumpExit::ReadFailed;
            }
        }
    }
    PumpExit::ClosedByPeer
}

/// Drains `outbound` into `sink`, giving each write `deadline` to complete.
///
/// Stops as soon as `closed` fires, leaving anything still queued
/// undelivered, or when the channel closes. Either way the sink is closed,
/// which for a WebSocket sends a close frame.
pub async fn write_pump<K>(
    mut outbound: mpsc::Receiver<String>,
    mut sink: K,
    deadline: Duration,
    closed: CancellationToken,
) -> PumpExit
where
    K: Sink<String> + Unpin,
    K::Error: Display,
{
    loop {
        let text = tokio::select! {
            biased;
            _ = closed.cancelled() => break,
            next = outbound.recv() => match next {
                Some(text) => text,
                None => break,
            },
        };

        match tokio::time::timeout(deadline, sink.send(text)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(error = %e, "Write failed");
                return PumpExit::WriteFailed;
            }
            Err(_) => return PumpExit::DeadlineExceeded,
        }
    }

    let _ = tokio::time::timeout(deadline, sink.close()).await;
    PumpExit::ChannelClosed
}
